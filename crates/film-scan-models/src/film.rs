use serde::{Deserialize, Serialize};

/// One film as scraped from a Letterboxd list page.
///
/// Identity is the `slug`: two records with the same slug are the same
/// film even if the displayed title has been reworded since.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilmRecord {
    pub slug: String,
    pub title: String,
    pub year: Option<u16>,
}

impl FilmRecord {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            year,
        }
    }

    /// Composite key used by the scan history and by table pruning.
    /// A film with no known year contributes an empty year suffix.
    pub fn scan_key(&self) -> String {
        scan_key(&self.title, self.year)
    }
}

/// `"{title}_{year}"` composite key shared by films and offer rows.
pub fn scan_key(title: &str, year: Option<u16>) -> String {
    match year {
        Some(y) => format!("{}_{}", title, y),
        None => format!("{}_", title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_key_with_year() {
        let film = FilmRecord::new("inception", "Inception", Some(2010));
        assert_eq!(film.scan_key(), "Inception_2010");
    }

    #[test]
    fn test_scan_key_without_year() {
        let film = FilmRecord::new("some-short", "Some Short", None);
        assert_eq!(film.scan_key(), "Some Short_");
    }

    #[test]
    fn test_identity_is_slug() {
        let a = FilmRecord::new("inception", "Inception", Some(2010));
        let b = FilmRecord::new("inception", "Inception", Some(2010));
        assert_eq!(a, b);
    }
}
