use crate::commands::scan::parse_country_list;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use film_scan_config::PathManager;
use film_scan_core::{group_rows, OfferFilter, OfferStore};

pub fn run_show(
    country: Option<String>,
    provider: Option<String>,
    title: Option<String>,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    let store = OfferStore::new(
        path_manager.offers_csv_file(),
        path_manager.offers_json_file(),
    );
    let rows = store.load();

    if rows.is_empty() {
        output.warn("No offer data found. Run 'streamscout scan' first");
        return Ok(());
    }

    let filter = OfferFilter {
        countries: country.map(|c| parse_country_list(&c)).unwrap_or_default(),
        providers: provider
            .map(|p| {
                p.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default(),
        title_contains: title,
    };
    let filtered = filter.apply(&rows);

    if !output.is_human() {
        output.json(&serde_json::to_value(&filtered)?);
        return Ok(());
    }

    if filtered.is_empty() {
        output.warn("No rows match those filters");
        return Ok(());
    }

    let groups = group_rows(&filtered);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Title", "Year", "Runtime", "Streaming on"]);

    for group in &groups {
        let year = group
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "—".to_string());
        let runtime = group
            .runtime
            .map(|r| format!("{} min", r))
            .unwrap_or_else(|| "—".to_string());
        let availability = group
            .entries
            .iter()
            .map(|(country, provider)| format!("{}: {}", country, provider))
            .collect::<Vec<_>>()
            .join(", ");

        table.add_row(vec![
            Cell::new(&group.title),
            Cell::new(year),
            Cell::new(runtime),
            Cell::new(availability),
        ]);
    }

    println!("{table}");
    output.info(format!(
        "{} films, {} offer rows",
        groups.len(),
        filtered.len()
    ));

    Ok(())
}
