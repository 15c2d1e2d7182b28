use anyhow::Result;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Scan keys of films already checked in some prior cycle, serialized as
/// a JSON list. Replaced wholesale at the end of every cycle; only used
/// to decide which films need re-checking, never for result correctness.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the history set. A missing or unreadable file counts as an
    /// empty history (the next cycle simply re-scans everything).
    pub fn load(&self) -> HashSet<String> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No history file, starting empty");
            return HashSet::new();
        }

        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Vec<String>>(&content) {
                Ok(keys) => {
                    debug!(entries = keys.len(), "Loaded scan history");
                    keys.into_iter().collect()
                }
                Err(e) => {
                    warn!(path = ?self.path, error = %e, "History file corrupt, treating as empty");
                    HashSet::new()
                }
            },
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Failed to read history file, treating as empty");
                HashSet::new()
            }
        }
    }

    /// Replace the history with the full current key set.
    pub fn save(&self, keys: &HashSet<String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut sorted: Vec<&String> = keys.iter().collect();
        sorted.sort();
        let content = serde_json::to_string_pretty(&sorted)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;

        debug!(entries = keys.len(), "Saved scan history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_history_roundtrip() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));

        let keys: HashSet<String> = ["Inception_2010".to_string(), "Heat_1995".to_string()]
            .into_iter()
            .collect();
        store.save(&keys).unwrap();

        assert_eq!(store.load(), keys);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nope.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{{not json").unwrap();

        let store = HistoryStore::new(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_replaces_wholesale() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));

        let first: HashSet<String> = ["A_2001".to_string()].into_iter().collect();
        store.save(&first).unwrap();

        let second: HashSet<String> = ["B_2002".to_string()].into_iter().collect();
        store.save(&second).unwrap();

        assert_eq!(store.load(), second);
    }
}
