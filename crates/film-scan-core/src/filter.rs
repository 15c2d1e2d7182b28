// Read-only filtering and grouping for the display layer

use film_scan_models::OfferRow;

/// Criteria the display layer filters the offer table by. Empty lists
/// mean "no restriction".
#[derive(Debug, Default, Clone)]
pub struct OfferFilter {
    pub countries: Vec<String>,
    pub providers: Vec<String>,
    pub title_contains: Option<String>,
}

impl OfferFilter {
    pub fn matches(&self, row: &OfferRow) -> bool {
        if !self.countries.is_empty()
            && !self
                .countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&row.country))
        {
            return false;
        }
        if !self.providers.is_empty()
            && !self
                .providers
                .iter()
                .any(|p| p.eq_ignore_ascii_case(&row.provider))
        {
            return false;
        }
        if let Some(ref needle) = self.title_contains {
            if !row.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, rows: &[OfferRow]) -> Vec<OfferRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// One film with all its (country, provider) availability entries,
/// poster and runtime carried from the first row seen.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmGroup {
    pub title: String,
    pub year: Option<u16>,
    pub poster_url: String,
    pub runtime: Option<u32>,
    pub entries: Vec<(String, String)>,
}

/// Group rows by `(title, year)`, preserving first-seen order of both
/// the films and their entries.
pub fn group_rows(rows: &[OfferRow]) -> Vec<FilmGroup> {
    let mut groups: Vec<FilmGroup> = Vec::new();

    for row in rows {
        let entry = (row.country.clone(), row.provider.clone());
        match groups
            .iter_mut()
            .find(|g| g.title == row.title && g.year == row.year)
        {
            Some(group) => {
                if !group.entries.contains(&entry) {
                    group.entries.push(entry);
                }
            }
            None => groups.push(FilmGroup {
                title: row.title.clone(),
                year: row.year,
                poster_url: row.poster_url.clone(),
                runtime: row.runtime,
                entries: vec![entry],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(title: &str, country: &str, provider: &str) -> OfferRow {
        OfferRow {
            title: title.to_string(),
            year: Some(2020),
            country: country.to_string(),
            provider: provider.to_string(),
            poster_url: "poster".to_string(),
            runtime: Some(110),
            last_updated: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let rows = vec![row("A", "US", "Netflix"), row("B", "ES", "Max")];
        assert_eq!(OfferFilter::default().apply(&rows).len(), 2);
    }

    #[test]
    fn test_country_and_provider_filters() {
        let rows = vec![
            row("A", "US", "Netflix"),
            row("A", "ES", "Netflix"),
            row("B", "US", "Max"),
        ];

        let by_country = OfferFilter {
            countries: vec!["us".to_string()],
            ..Default::default()
        };
        assert_eq!(by_country.apply(&rows).len(), 2);

        let by_provider = OfferFilter {
            providers: vec!["netflix".to_string()],
            ..Default::default()
        };
        assert_eq!(by_provider.apply(&rows).len(), 2);
    }

    #[test]
    fn test_title_substring_filter_is_case_insensitive() {
        let rows = vec![row("Inception", "US", "Netflix"), row("Heat", "US", "Max")];
        let filter = OfferFilter {
            title_contains: Some("incep".to_string()),
            ..Default::default()
        };
        let filtered = filter.apply(&rows);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Inception");
    }

    #[test]
    fn test_group_rows_by_title_and_year() {
        let rows = vec![
            row("A", "US", "Netflix"),
            row("A", "ES", "Netflix"),
            row("B", "US", "Max"),
            row("A", "US", "Netflix"), // duplicate entry collapses
        ];

        let groups = group_rows(&rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].title, "A");
        assert_eq!(
            groups[0].entries,
            vec![
                ("US".to_string(), "Netflix".to_string()),
                ("ES".to_string(), "Netflix".to_string()),
            ]
        );
        assert_eq!(groups[1].title, "B");
    }
}
