use async_trait::async_trait;
use film_scan_models::{FilmMetadata, FilmRecord};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::error::SourceError;

/// A film-logging site the user's lists are scraped from.
#[async_trait]
pub trait FilmListSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Films the user intends to watch.
    async fn get_watchlist(&self) -> Result<Vec<FilmRecord>, SourceError>;

    /// Films the user has already logged as seen.
    async fn get_watched(&self) -> Result<Vec<FilmRecord>, SourceError>;
}

/// A validated search hit on the catalog site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    /// Absolute URL of the matched title's page.
    pub url: String,
    /// Displayed text of the search result, year included when shown.
    pub label: String,
}

/// A streaming catalog that can be searched per country.
///
/// The two phases are separate so the matching strategy can be swapped or
/// stubbed without touching the orchestrator; `find_offers` composes them
/// and is the only entry point the orchestrator calls.
#[async_trait]
pub trait OfferSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Find the catalog page for a film, tolerating ±1 year of release
    /// date drift. `Ok(None)` means no candidate validated.
    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
        country: &str,
    ) -> Result<Option<TitleMatch>, SourceError>;

    /// Raw provider display names of flat-rate streaming offers on the
    /// matched title's page. Rental and purchase offers are excluded.
    async fn extract_offers(
        &self,
        matched: &TitleMatch,
        country: &str,
    ) -> Result<Vec<String>, SourceError>;

    /// Best-effort lookup: any failure in either phase yields an empty
    /// set for this (film, country) and is logged, never propagated.
    async fn find_offers(&self, title: &str, year: Option<u16>, country: &str) -> BTreeSet<String> {
        match self.search(title, year, country).await {
            Ok(Some(matched)) => match self.extract_offers(&matched, country).await {
                Ok(providers) => providers.into_iter().collect(),
                Err(e) => {
                    warn!(
                        source = self.source_name(),
                        title, country, error = %e,
                        "Offer extraction failed, treating as no offers"
                    );
                    BTreeSet::new()
                }
            },
            Ok(None) => {
                debug!(
                    source = self.source_name(),
                    title, country, "No validated catalog match"
                );
                BTreeSet::new()
            }
            Err(e) => {
                warn!(
                    source = self.source_name(),
                    title, country, error = %e,
                    "Catalog search failed, treating as no offers"
                );
                BTreeSet::new()
            }
        }
    }

    // Called when the scan cycle completes to free resources (e.g. close browser instances)
    async fn cleanup(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// Poster/runtime lookup. Must never fail: implementations degrade to
/// [`FilmMetadata::placeholder`] on any error.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn lookup(&self, title: &str, year: Option<u16>) -> FilmMetadata;
}
