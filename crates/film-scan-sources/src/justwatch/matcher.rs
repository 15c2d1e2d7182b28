use crate::traits::TitleMatch;

/// All standalone 4-digit year groups in a text, bounded to plausible
/// film years so street numbers and IDs do not match.
pub fn extract_years(text: &str) -> Vec<u16> {
    let mut years = Vec::new();
    let mut run_start: Option<usize> = None;
    let bytes = text.as_bytes();

    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            if run_start.is_none() {
                run_start = Some(i);
            }
        } else if let Some(start) = run_start.take() {
            push_if_year(&text[start..i], &mut years);
        }
    }
    if let Some(start) = run_start {
        push_if_year(&text[start..], &mut years);
    }

    years
}

fn push_if_year(run: &str, years: &mut Vec<u16>) {
    if run.len() == 4 {
        if let Ok(year) = run.parse::<u16>() {
            if (1880..=2100).contains(&year) {
                years.push(year);
            }
        }
    }
}

/// A candidate validates when its displayed text contains a year within
/// ±1 of the target, tolerating re-release and regional-release drift.
/// Films with no known year accept any candidate.
pub fn year_matches(label: &str, target: Option<u16>) -> bool {
    match target {
        None => true,
        Some(t) => extract_years(label)
            .iter()
            .any(|y| (*y as i32 - t as i32).abs() <= 1),
    }
}

/// First validated candidate wins; there is no ranking beyond that.
pub fn pick_candidate(candidates: &[TitleMatch], target_year: Option<u16>) -> Option<&TitleMatch> {
    candidates.iter().find(|c| year_matches(&c.label, target_year))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, label: &str) -> TitleMatch {
        TitleMatch {
            url: url.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_extract_years() {
        assert_eq!(extract_years("The Sound of Music (1965)"), vec![1965]);
        assert_eq!(extract_years("Blade Runner 2049 (2017)"), vec![2049, 2017]);
        assert_eq!(extract_years("no year here"), Vec::<u16>::new());
        // 5-digit runs and out-of-range values are not years
        assert_eq!(extract_years("id 12345 and 0042"), Vec::<u16>::new());
    }

    #[test]
    fn test_year_tolerance_window() {
        for accepted in [1964, 1965, 1966] {
            assert!(year_matches("The Sound of Music (1965)", Some(accepted)));
        }
        for rejected in [1963, 1967] {
            assert!(!year_matches("The Sound of Music (1965)", Some(rejected)));
        }
    }

    #[test]
    fn test_unknown_target_year_accepts_any_candidate() {
        assert!(year_matches("Some Film", None));
        assert!(year_matches("Some Film (1999)", None));
    }

    #[test]
    fn test_label_without_year_fails_known_target() {
        assert!(!year_matches("Some Film", Some(1999)));
    }

    #[test]
    fn test_pick_candidate_takes_first_validated() {
        let candidates = vec![
            candidate("/us/movie/heat-handball", "Heat (2013)"),
            candidate("/us/movie/heat", "Heat (1995)"),
            candidate("/us/movie/heat-remaster", "Heat (1996)"),
        ];
        let picked = pick_candidate(&candidates, Some(1995)).unwrap();
        assert_eq!(picked.url, "/us/movie/heat");
    }

    #[test]
    fn test_pick_candidate_none_when_no_year_fits() {
        let candidates = vec![candidate("/us/movie/heat-handball", "Heat (2013)")];
        assert!(pick_candidate(&candidates, Some(1995)).is_none());
    }
}
