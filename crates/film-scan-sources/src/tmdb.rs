use async_trait::async_trait;
use film_scan_models::{FilmMetadata, PLACEHOLDER_POSTER_URL};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::traits::MetadataSource;

const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    runtime: Option<u32>,
}

/// TMDB poster/runtime lookup. Failures never escape [`MetadataSource::lookup`]:
/// the pipeline renders a placeholder instead.
pub struct TmdbClient {
    http: Client,
    token: String,
}

impl TmdbClient {
    pub fn new(token: String) -> Result<Self, SourceError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, token })
    }

    async fn try_lookup(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<FilmMetadata, SourceError> {
        let mut request = self
            .http
            .get(format!("{}/search/movie", TMDB_API_BASE))
            .bearer_auth(&self.token)
            .query(&[("query", title), ("language", "en-US")]);
        if let Some(y) = year {
            request = request.query(&[("year", y.to_string())]);
        }

        let search: SearchResponse = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let hit = search
            .results
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::parse(format!("no TMDB results for '{}'", title)))?;

        let details: MovieDetails = self
            .http
            .get(format!("{}/movie/{}", TMDB_API_BASE, hit.id))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let poster_url = hit
            .poster_path
            .map(|p| format!("{}{}", TMDB_IMAGE_BASE, p))
            .unwrap_or_else(|| PLACEHOLDER_POSTER_URL.to_string());

        // TMDB reports 0 for titles with no known runtime
        let runtime = details.runtime.filter(|r| *r > 0);

        debug!(title, ?runtime, "TMDB metadata resolved");
        Ok(FilmMetadata::new(poster_url, runtime))
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    fn source_name(&self) -> &str {
        "tmdb"
    }

    async fn lookup(&self, title: &str, year: Option<u16>) -> FilmMetadata {
        match self.try_lookup(title, year).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(title, error = %e, "TMDB lookup failed, using placeholder");
                FilmMetadata::placeholder()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_shape() {
        let body = r#"{"page":1,"results":[{"id":27205,"title":"Inception","poster_path":"/inc.jpg","release_date":"2010-07-15"}]}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.results[0].id, 27205);
        assert_eq!(parsed.results[0].poster_path.as_deref(), Some("/inc.jpg"));
    }

    #[test]
    fn test_details_runtime_optional() {
        let parsed: MovieDetails = serde_json::from_str(r#"{"runtime":148}"#).unwrap();
        assert_eq!(parsed.runtime, Some(148));

        let parsed: MovieDetails = serde_json::from_str(r#"{"runtime":null}"#).unwrap();
        assert_eq!(parsed.runtime, None);
    }
}
