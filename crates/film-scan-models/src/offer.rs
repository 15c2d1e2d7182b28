use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::film::scan_key;

/// One (film, country, provider) availability entry in the persisted table.
///
/// The table holds at most one row per `(title, year, country, provider)`;
/// merging keeps the newest `last_updated` on conflict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferRow {
    pub title: String,
    pub year: Option<u16>,
    /// ISO 3166 alpha-2, uppercased.
    pub country: String,
    /// Normalized provider name.
    pub provider: String,
    pub poster_url: String,
    /// Runtime in minutes, when the metadata lookup knew it.
    pub runtime: Option<u32>,
    pub last_updated: NaiveDate,
}

impl OfferRow {
    /// Key identifying the film this row belongs to, matching
    /// [`crate::FilmRecord::scan_key`]. Used when pruning rows for films
    /// that left the watchlist.
    pub fn film_key(&self) -> String {
        scan_key(&self.title, self.year)
    }

    /// Uniqueness key within the persisted table.
    pub fn dedup_key(&self) -> (String, Option<u16>, String, String) {
        (
            self.title.clone(),
            self.year,
            self.country.clone(),
            self.provider.clone(),
        )
    }
}
