// Watchlist-versus-watched set difference

use film_scan_models::FilmRecord;
use std::collections::HashSet;
use tracing::debug;

/// Every watchlist record whose slug does not appear in the watched set,
/// in watchlist order. Slugs are the stable identity, so a retitled film
/// still counts as watched.
pub fn resolve_unwatched(watchlist: &[FilmRecord], watched: &[FilmRecord]) -> Vec<FilmRecord> {
    let watched_slugs: HashSet<&str> = watched.iter().map(|f| f.slug.as_str()).collect();

    let unwatched: Vec<FilmRecord> = watchlist
        .iter()
        .filter(|f| !watched_slugs.contains(f.slug.as_str()))
        .cloned()
        .collect();

    debug!(
        watchlist = watchlist.len(),
        watched = watched.len(),
        unwatched = unwatched.len(),
        "Resolved unwatched films"
    );

    unwatched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(slug: &str, title: &str) -> FilmRecord {
        FilmRecord::new(slug, title, Some(2020))
    }

    #[test]
    fn test_resolve_unwatched_basic() {
        let watchlist = vec![
            film("film-1", "Film 1"),
            film("film-2", "Film 2"),
            film("film-3", "Film 3"),
        ];
        let watched = vec![film("film-2", "Film 2")];

        let unwatched = resolve_unwatched(&watchlist, &watched);
        assert_eq!(unwatched.len(), 2);
        assert_eq!(unwatched[0].slug, "film-1");
        assert_eq!(unwatched[1].slug, "film-3");
    }

    #[test]
    fn test_resolve_empty_watched_passes_through() {
        let watchlist = vec![film("film-1", "Film 1"), film("film-2", "Film 2")];
        let unwatched = resolve_unwatched(&watchlist, &[]);
        assert_eq!(unwatched, watchlist);
    }

    #[test]
    fn test_resolve_fully_watched_is_empty() {
        let watchlist = vec![film("film-1", "Film 1"), film("film-2", "Film 2")];
        let unwatched = resolve_unwatched(&watchlist, &watchlist.clone());
        assert!(unwatched.is_empty());
    }

    #[test]
    fn test_resolve_empty_watchlist_is_empty() {
        let watched = vec![film("film-1", "Film 1")];
        assert!(resolve_unwatched(&[], &watched).is_empty());
    }

    #[test]
    fn test_identity_is_slug_not_title() {
        let watchlist = vec![film("film-1", "Film One (Director's Cut)")];
        let watched = vec![film("film-1", "Film One")];
        assert!(resolve_unwatched(&watchlist, &watched).is_empty());
    }
}
