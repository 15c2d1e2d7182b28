use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub letterboxd: LetterboxdConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LetterboxdConfig {
    /// Account whose watched/watchlist pages are scraped.
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScanConfig {
    /// Countries checked for offers, in scan order (ISO alpha-2).
    #[serde(default = "default_country_scan")]
    pub country_scan: Vec<String>,

    /// Weekday on which a full scan runs regardless of history
    /// (the 1st of the month always triggers a full scan too).
    #[serde(default = "default_full_scan_weekday")]
    pub full_scan_weekday: String,

    /// Whether full scans subtract the watched list from the target set.
    #[serde(default = "default_true")]
    pub compare_watched: bool,

    /// Safety bound on list pagination.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Politeness delay between list page fetches.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Politeness delay between (film, country) catalog checks.
    #[serde(default = "default_task_delay_ms")]
    pub task_delay_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

fn default_true() -> bool {
    true
}

fn default_country_scan() -> Vec<String> {
    vec!["US".to_string()]
}

fn default_full_scan_weekday() -> String {
    "Mon".to_string()
}

fn default_max_pages() -> u32 {
    100
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_task_delay_ms() -> u64 {
    1500
}

fn default_schedule() -> String {
    "0 0 6 * * *".to_string() // daily at 06:00
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            country_scan: default_country_scan(),
            full_scan_weekday: default_full_scan_weekday(),
            compare_watched: default_true(),
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            task_delay_ms: default_task_delay_ms(),
        }
    }
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        run_on_startup: default_true(),
    }
}

impl ScanConfig {
    /// Parsed form of `full_scan_weekday`; validated in [`Config::validate`].
    pub fn full_scan_weekday(&self) -> anyhow::Result<Weekday> {
        Weekday::from_str(&self.full_scan_weekday)
            .map_err(|_| anyhow::anyhow!("Invalid full_scan_weekday: {}", self.full_scan_weekday))
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.letterboxd.username.is_empty() {
            return Err(anyhow::anyhow!(
                "letterboxd.username is required and cannot be empty"
            ));
        }

        if self.scan.country_scan.is_empty() {
            return Err(anyhow::anyhow!("scan.country_scan cannot be empty"));
        }
        for country in &self.scan.country_scan {
            if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(anyhow::anyhow!(
                    "Invalid country code in scan.country_scan: {}",
                    country
                ));
            }
        }

        self.scan.full_scan_weekday()?;

        if self.scan.max_pages == 0 {
            return Err(anyhow::anyhow!("scan.max_pages must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn base_config() -> Config {
        Config {
            letterboxd: LetterboxdConfig {
                username: "cinephile".to_string(),
            },
            scan: ScanConfig::default(),
            scheduler: None,
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = base_config();
        config.scan.country_scan = vec!["US".to_string(), "ES".to_string()];

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.letterboxd.username, "cinephile");
        assert_eq!(loaded.scan.country_scan, vec!["US", "ES"]);
        assert_eq!(loaded.scan.full_scan_weekday, "Mon");
        assert!(loaded.scan.compare_watched);
    }

    #[test]
    fn test_defaults_fill_missing_scan_section() {
        let parsed: Config = toml::from_str("[letterboxd]\nusername = \"cinephile\"\n").unwrap();
        assert_eq!(parsed.scan.country_scan, vec!["US"]);
        assert_eq!(parsed.scan.max_pages, 100);
        assert_eq!(parsed.scan.page_delay_ms, 1000);
    }

    #[test]
    fn test_validate_rejects_empty_username() {
        let mut config = base_config();
        config.letterboxd.username = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_country_code() {
        let mut config = base_config();
        config.scan.country_scan = vec!["USA".to_string()];
        assert!(config.validate().is_err());

        config.scan.country_scan = vec!["U1".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_weekday() {
        let mut config = base_config();
        config.scan.full_scan_weekday = "Someday".to_string();
        assert!(config.validate().is_err());

        config.scan.full_scan_weekday = "Sun".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.full_scan_weekday().unwrap(), Weekday::Sun);
    }
}
