use crate::output::Output;
use color_eyre::Result;
use dialoguer::Confirm;
use film_scan_config::PathManager;
use std::path::Path;

pub fn run_clear(all: bool, history: bool, offers: bool, output: &Output) -> Result<()> {
    if !all && !history && !offers {
        output.warn("Nothing to clear. Use --history, --offers, or --all");
        return Ok(());
    }

    if all && output.is_human() && !output.is_quiet() {
        let confirmed = Confirm::new()
            .with_prompt("Delete the offer table and the scan history?")
            .default(false)
            .interact()?;
        if !confirmed {
            output.info("Aborted");
            return Ok(());
        }
    }

    let path_manager = PathManager::default();

    if all || history {
        remove_if_present(&path_manager.history_file(), "scan history", output)?;
    }
    if all || offers {
        remove_if_present(&path_manager.offers_csv_file(), "offer table", output)?;
        remove_if_present(&path_manager.offers_json_file(), "offer table mirror", output)?;
    }

    Ok(())
}

fn remove_if_present(path: &Path, label: &str, output: &Output) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
        output.success(format!("Cleared {} ({})", label, path.display()));
    } else {
        output.info(format!("No {} to clear", label));
    }
    Ok(())
}
