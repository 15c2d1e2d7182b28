use crate::commands::scan::run_scan_cycle;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use film_scan_config::{config::default_scheduler_config, Config, PathManager};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

/// Run in the foreground, scanning on the configured cron schedule.
/// Scan failures are logged and the daemon keeps running; only a broken
/// schedule or scheduler startup failure aborts.
pub async fn run_daemon(
    schedule_override: Option<String>,
    no_startup_scan: bool,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();
    let config = Config::load_from_file(&config_file).map_err(|e| {
        eyre!(
            "Failed to load config from {}: {}. Run 'streamscout config letterboxd' first",
            config_file.display(),
            e
        )
    })?;
    config.validate().map_err(|e| eyre!("{}", e))?;

    let default_config = default_scheduler_config();
    let scheduler_config = config.scheduler.as_ref().unwrap_or(&default_config);
    let schedule = schedule_override.unwrap_or_else(|| scheduler_config.schedule.clone());
    let run_on_startup = scheduler_config.run_on_startup && !no_startup_scan;

    output.info(format!("Starting daemon with schedule '{}'", schedule));
    info!(
        operation = "daemon_start",
        schedule = %schedule,
        run_on_startup,
        "Daemon starting"
    );

    if run_on_startup {
        info!("Running startup scan");
        match run_scan_cycle(false, None).await {
            Ok(result) => info!(
                mode = %result.mode,
                rows = result.rows_written,
                "Startup scan completed"
            ),
            Err(e) => error!(error = %e, "Startup scan failed"),
        }
    }

    let mut scheduler = JobScheduler::new()
        .await
        .map_err(|e| eyre!("Failed to create scheduler: {}", e))?;

    let job = Job::new_async(schedule.as_str(), |_uuid, _lock| {
        Box::pin(async {
            info!("Scheduled scan starting");
            match run_scan_cycle(false, None).await {
                Ok(result) => info!(
                    mode = %result.mode,
                    rows = result.rows_written,
                    errors = result.errors.len(),
                    "Scheduled scan completed"
                ),
                Err(e) => error!(error = %e, "Scheduled scan failed"),
            }
        })
    })
    .map_err(|e| eyre!("Invalid schedule '{}': {}", schedule, e))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| eyre!("Failed to add scan job: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| eyre!("Failed to start scheduler: {}", e))?;

    info!(operation = "daemon_started", "Scheduler running");

    // Foreground daemon: the scheduler drives everything, this task only
    // keeps the process alive.
    loop {
        tokio::time::sleep(tokio::time::Duration::from_secs(3600)).await;
    }
}
