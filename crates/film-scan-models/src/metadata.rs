use serde::{Deserialize, Serialize};

/// Placeholder shown when no poster could be resolved for a film.
pub const PLACEHOLDER_POSTER_URL: &str = "https://via.placeholder.com/500x750?text=No+Poster";

/// Poster and runtime for one film, cached per scan cycle so a film
/// checked for several countries costs a single metadata lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilmMetadata {
    pub poster_url: String,
    pub runtime: Option<u32>,
}

impl FilmMetadata {
    pub fn new(poster_url: impl Into<String>, runtime: Option<u32>) -> Self {
        Self {
            poster_url: poster_url.into(),
            runtime,
        }
    }

    /// Fallback returned when the lookup service errors or finds nothing.
    pub fn placeholder() -> Self {
        Self {
            poster_url: PLACEHOLDER_POSTER_URL.to_string(),
            runtime: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_has_no_runtime() {
        let meta = FilmMetadata::placeholder();
        assert_eq!(meta.poster_url, PLACEHOLDER_POSTER_URL);
        assert!(meta.runtime.is_none());
    }
}
