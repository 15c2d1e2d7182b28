use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use film_scan_config::{Config, CredentialStore, PathManager};
use film_scan_core::{HistoryStore, OfferStore, ScanOptions, ScanOrchestrator, ScanResult};
use film_scan_sources::{JustWatchClient, LetterboxdClient, TmdbClient};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::time::Duration;

/// Build the pipeline from configuration and run one cycle. Shared with
/// the daemon, which has no interactive output.
pub async fn run_scan_cycle(
    force_full: bool,
    countries_override: Option<Vec<String>>,
) -> anyhow::Result<ScanResult> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()?;

    let config_file = path_manager.config_file();
    let config = Config::load_from_file(&config_file).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load config from {}: {}. Run 'streamscout config letterboxd' first",
            config_file.display(),
            e
        )
    })?;
    config.validate()?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store.load()?;
    let tmdb_token = cred_store
        .get_tmdb_token()
        .ok_or_else(|| {
            anyhow::anyhow!("TMDB token not configured. Run 'streamscout config tmdb' first")
        })?
        .clone();

    let countries = countries_override.unwrap_or_else(|| config.scan.country_scan.clone());

    let letterboxd = LetterboxdClient::new(config.letterboxd.username.clone(), &config.scan)?;
    let justwatch = JustWatchClient::new().await?;
    let tmdb = TmdbClient::new(tmdb_token)?;

    let options = ScanOptions {
        countries,
        full_scan_weekday: config.scan.full_scan_weekday()?,
        compare_watched: config.scan.compare_watched,
        force_full,
        task_delay: Duration::from_millis(config.scan.task_delay_ms),
    };

    let mut orchestrator = ScanOrchestrator::new(
        Box::new(letterboxd),
        Box::new(justwatch),
        Box::new(tmdb),
        OfferStore::new(
            path_manager.offers_csv_file(),
            path_manager.offers_json_file(),
        ),
        HistoryStore::new(path_manager.history_file()),
    )
    .with_options(options);

    orchestrator.scan().await
}

pub async fn run_scan(
    force_full: bool,
    countries: Option<String>,
    output: &Output,
) -> Result<()> {
    let countries_override = countries.map(|list| parse_country_list(&list));

    let spinner = if output.is_human() && !output.is_quiet() {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .map_err(|e| eyre!("Invalid spinner template: {}", e))?,
        );
        spinner.set_message("Scanning watchlist and streaming catalogs...");
        spinner.enable_steady_tick(Duration::from_millis(120));
        Some(spinner)
    } else {
        None
    };

    let result = run_scan_cycle(force_full, countries_override).await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let result = result.map_err(|e| eyre!("Scan cycle failed: {:#}", e))?;

    match output.format() {
        crate::output::OutputFormat::Human => {
            output.success(format!(
                "{} scan finished: {} of {} watchlist films checked, {} rows persisted in {:.1}s",
                result.mode,
                result.films_scanned,
                result.watchlist_films,
                result.rows_written,
                result.duration.as_secs_f64()
            ));
            for error in &result.errors {
                output.warn(error);
            }
        }
        _ => {
            output.json(&json!({
                "type": "scan_result",
                "mode": result.mode.to_string(),
                "watchlist_films": result.watchlist_films,
                "films_scanned": result.films_scanned,
                "rows_written": result.rows_written,
                "duration_seconds": result.duration.as_secs_f64(),
                "errors": result.errors,
            }));
        }
    }

    Ok(())
}

pub fn parse_country_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}
