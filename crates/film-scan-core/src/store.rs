use anyhow::{anyhow, Result};
use film_scan_models::OfferRow;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// The persisted offer table: CSV as the durable form the display layer
/// reads, with a JSON mirror written alongside. Read once at cycle start,
/// fully rewritten at cycle end.
pub struct OfferStore {
    csv_path: PathBuf,
    json_path: PathBuf,
}

impl OfferStore {
    pub fn new(csv_path: PathBuf, json_path: PathBuf) -> Self {
        Self {
            csv_path,
            json_path,
        }
    }

    /// Load the table. A missing file is an empty table; an unreadable or
    /// malformed file is logged and also treated as empty, so a damaged
    /// state file costs one full re-scan instead of aborting the cycle.
    pub fn load(&self) -> Vec<OfferRow> {
        if !self.csv_path.exists() {
            debug!(path = ?self.csv_path, "No offer table yet, starting empty");
            return Vec::new();
        }

        let mut reader = match csv::Reader::from_path(&self.csv_path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!(path = ?self.csv_path, error = %e, "Failed to open offer table, treating as empty");
                return Vec::new();
            }
        };

        let mut rows = Vec::new();
        for record in reader.deserialize::<OfferRow>() {
            match record {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(path = ?self.csv_path, error = %e, "Offer table corrupt, treating as empty");
                    return Vec::new();
                }
            }
        }

        info!(rows = rows.len(), "Loaded persisted offer table");
        rows
    }

    /// Rewrite the table. Both files go through a temp-file-plus-rename
    /// so a crash mid-write leaves the previous table intact.
    pub fn save(&self, rows: &[OfferRow]) -> Result<()> {
        if let Some(parent) = self.csv_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_csv = self.csv_path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp_csv)
                .map_err(|e| anyhow!("Failed to create offer table writer: {}", e))?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp_csv, &self.csv_path)?;

        let tmp_json = self.json_path.with_extension("json.tmp");
        std::fs::write(&tmp_json, serde_json::to_string_pretty(rows)?)?;
        std::fs::rename(&tmp_json, &self.json_path)?;

        info!(rows = rows.len(), path = ?self.csv_path, "Saved offer table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn store(dir: &std::path::Path) -> OfferStore {
        OfferStore::new(dir.join("offers.csv"), dir.join("offers.json"))
    }

    fn row(title: &str, year: Option<u16>, provider: &str) -> OfferRow {
        OfferRow {
            title: title.to_string(),
            year,
            country: "US".to_string(),
            provider: provider.to_string(),
            poster_url: "https://image.tmdb.org/t/p/w500/x.jpg".to_string(),
            runtime: Some(120),
            last_updated: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        }
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        let rows = vec![
            row("Inception", Some(2010), "Netflix"),
            row("Some Short", None, "MUBI"),
        ];
        store.save(&rows).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(store(dir.path()).load().is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("offers.csv"), "title,year\nonly,two,columns,nope\n")
            .unwrap();
        assert!(store(dir.path()).load().is_empty());
    }

    #[test]
    fn test_save_overwrites_fully() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store.save(&[row("A", Some(2001), "Netflix")]).unwrap();
        store.save(&[row("B", Some(2002), "Max")]).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "B");

        // JSON mirror follows the CSV
        let json = std::fs::read_to_string(dir.path().join("offers.json")).unwrap();
        assert!(json.contains("\"B\""));
        assert!(!json.contains("\"A\""));
    }
}
