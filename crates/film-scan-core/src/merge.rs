// Merge and prune logic for the persisted offer table

use film_scan_models::OfferRow;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Drop every row whose film key is absent from the live watchlist.
/// A film removed from the watchlist loses its rows even when the cycle
/// never re-scanned it.
pub fn prune_rows(rows: Vec<OfferRow>, live_keys: &HashSet<String>) -> Vec<OfferRow> {
    let before = rows.len();
    let pruned: Vec<OfferRow> = rows
        .into_iter()
        .filter(|row| live_keys.contains(&row.film_key()))
        .collect();

    if pruned.len() != before {
        debug!(
            removed = before - pruned.len(),
            remaining = pruned.len(),
            "Pruned rows for films no longer on the watchlist"
        );
    }
    pruned
}

/// Union existing rows with freshly scanned rows, keeping at most one row
/// per `(title, year, country, provider)` and preferring the newest
/// `last_updated` on conflict (a tie goes to the later-arriving row).
/// First-seen order is preserved.
pub fn merge_incremental(existing: Vec<OfferRow>, new_rows: Vec<OfferRow>) -> Vec<OfferRow> {
    let mut merged: Vec<OfferRow> = Vec::with_capacity(existing.len() + new_rows.len());
    let mut index_by_key: HashMap<(String, Option<u16>, String, String), usize> = HashMap::new();

    for row in existing.into_iter().chain(new_rows.into_iter()) {
        let key = row.dedup_key();
        match index_by_key.get(&key) {
            Some(&idx) => {
                if row.last_updated >= merged[idx].last_updated {
                    merged[idx] = row;
                }
            }
            None => {
                index_by_key.insert(key, merged.len());
                merged.push(row);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    fn row(title: &str, country: &str, provider: &str, day: u32) -> OfferRow {
        OfferRow {
            title: title.to_string(),
            year: Some(2020),
            country: country.to_string(),
            provider: provider.to_string(),
            poster_url: "poster".to_string(),
            runtime: Some(120),
            last_updated: date(day),
        }
    }

    #[test]
    fn test_merge_keeps_newest_on_conflict() {
        let existing = vec![row("A", "US", "Netflix", 1)];
        let new_rows = vec![row("A", "US", "Netflix", 5)];

        let merged = merge_incremental(existing, new_rows);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].last_updated, date(5));
    }

    #[test]
    fn test_merge_newer_existing_survives_stale_row() {
        let existing = vec![row("A", "US", "Netflix", 7)];
        let new_rows = vec![row("A", "US", "Netflix", 3)];

        let merged = merge_incremental(existing, new_rows);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].last_updated, date(7));
    }

    #[test]
    fn test_merge_tie_prefers_new_row() {
        let mut old = row("A", "US", "Netflix", 4);
        old.runtime = None;
        let new = row("A", "US", "Netflix", 4);

        let merged = merge_incremental(vec![old], vec![new]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].runtime, Some(120));
    }

    #[test]
    fn test_merge_distinct_keys_all_survive() {
        let existing = vec![row("A", "US", "Netflix", 1), row("A", "ES", "Netflix", 1)];
        let new_rows = vec![row("A", "US", "Max", 2), row("B", "US", "Netflix", 2)];

        let merged = merge_incremental(existing, new_rows);
        assert_eq!(merged.len(), 4);
        // First-seen order preserved
        assert_eq!(merged[0].country, "US");
        assert_eq!(merged[1].country, "ES");
    }

    #[test]
    fn test_prune_removes_departed_films() {
        let rows = vec![row("A", "US", "Netflix", 1), row("B", "US", "Netflix", 1)];
        let live: HashSet<String> = ["A_2020".to_string()].into_iter().collect();

        let pruned = prune_rows(rows, &live);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].title, "A");
    }

    #[test]
    fn test_prune_empty_watchlist_clears_table() {
        let rows = vec![row("A", "US", "Netflix", 1)];
        let pruned = prune_rows(rows, &HashSet::new());
        assert!(pruned.is_empty());
    }
}
