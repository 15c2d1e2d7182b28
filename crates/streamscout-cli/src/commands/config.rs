use crate::commands::scan::parse_country_list;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use dialoguer::Input;
use film_scan_config::{Config, CredentialStore, LetterboxdConfig, PathManager, ScanConfig};
use serde_json::json;

/// Load the existing config, or start from defaults so the first
/// `config letterboxd` run can create the file.
fn load_or_default(path_manager: &PathManager) -> Config {
    let config_file = path_manager.config_file();
    if config_file.exists() {
        if let Ok(config) = Config::load_from_file(&config_file) {
            return config;
        }
    }
    Config {
        letterboxd: LetterboxdConfig {
            username: String::new(),
        },
        scan: ScanConfig::default(),
        scheduler: None,
    }
}

pub fn show_config(output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_or_default(&path_manager);

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store.load().map_err(|e| eyre!("{}", e))?;
    let tmdb_state = if cred_store.get_tmdb_token().is_some() {
        "configured"
    } else {
        "not set"
    };

    if !output.is_human() {
        output.json(&json!({
            "type": "config",
            "letterboxd_user": config.letterboxd.username,
            "country_scan": config.scan.country_scan,
            "full_scan_weekday": config.scan.full_scan_weekday,
            "compare_watched": config.scan.compare_watched,
            "tmdb_token": tmdb_state,
            "config_file": path_manager.config_file().display().to_string(),
        }));
        return Ok(());
    }

    output.info(format!("Config file: {}", path_manager.config_file().display()));
    output.info(format!(
        "Letterboxd user: {}",
        if config.letterboxd.username.is_empty() {
            "(not set)"
        } else {
            &config.letterboxd.username
        }
    ));
    output.info(format!("Countries: {}", config.scan.country_scan.join(", ")));
    output.info(format!(
        "Full scan: every {} and the 1st of the month",
        config.scan.full_scan_weekday
    ));
    output.info(format!("Compare watched list: {}", config.scan.compare_watched));
    output.info(format!("TMDB token: {}", tmdb_state));

    Ok(())
}

pub fn set_letterboxd(username: Option<String>, output: &Output) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Letterboxd username")
            .interact_text()?,
    };
    if username.trim().is_empty() {
        return Err(eyre!("Username cannot be empty"));
    }

    let path_manager = PathManager::default();
    let mut config = load_or_default(&path_manager);
    config.letterboxd.username = username.trim().to_string();
    config
        .save_to_file(&path_manager.config_file())
        .map_err(|e| eyre!("Failed to save config: {}", e))?;

    output.success(format!(
        "Letterboxd user set to '{}'",
        config.letterboxd.username
    ));
    Ok(())
}

pub fn set_tmdb(token: Option<String>, output: &Output) -> Result<()> {
    let token = match token {
        Some(t) => t,
        None => rpassword::prompt_password("TMDB API token (v4 read access): ")?,
    };
    if token.trim().is_empty() {
        return Err(eyre!("Token cannot be empty"));
    }

    let path_manager = PathManager::default();
    path_manager.ensure_directories().map_err(|e| eyre!("{}", e))?;
    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store.load().map_err(|e| eyre!("{}", e))?;
    cred_store.set_tmdb_token(token.trim().to_string());
    cred_store
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success("TMDB token stored");
    Ok(())
}

pub fn set_countries(codes: &str, output: &Output) -> Result<()> {
    let countries = parse_country_list(codes);
    if countries.is_empty() {
        return Err(eyre!("No valid country codes in '{}'", codes));
    }
    for country in &countries {
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(eyre!("Invalid country code: {}", country));
        }
    }

    let path_manager = PathManager::default();
    let mut config = load_or_default(&path_manager);
    config.scan.country_scan = countries;
    config
        .save_to_file(&path_manager.config_file())
        .map_err(|e| eyre!("Failed to save config: {}", e))?;

    output.success(format!(
        "Scanning countries: {}",
        config.scan.country_scan.join(", ")
    ));
    Ok(())
}
