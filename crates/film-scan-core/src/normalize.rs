// Provider label canonicalization

/// Aggregator add-on suffixes appended to the actual provider name,
/// e.g. "Paramount+ Amazon Channel".
const CHANNEL_SUFFIXES: &[&str] = &[
    "amazon channel",
    "apple tv channel",
    "roku premium channel",
];

/// Plan/tier descriptors that do not change which service carries the film.
const TIER_SUFFIXES: &[&str] = &[
    "standard with ads",
    "with ads",
    "premium",
    "basic",
    "standard",
];

/// Spelling unifications applied after suffix stripping. Matched against
/// the whole remaining name, case-insensitively.
const BRAND_TABLE: &[(&str, &str)] = &[
    ("paramount plus", "Paramount+"),
    ("disney plus", "Disney+"),
    ("apple tv plus", "Apple TV+"),
    ("apple tv+", "Apple TV+"),
    ("hbo max", "Max"),
];

/// Canonicalize a raw provider label: strip `via <addon>` suffixes, then
/// tier descriptors, then unify brand spellings. Idempotent.
pub fn normalize_provider(raw: &str) -> String {
    let mut name = raw.trim().to_string();

    // 1. "<Provider> via <addon>" and "<Provider> <addon> Channel" forms
    if let Some(pos) = find_ci(&name, " via ") {
        name.truncate(pos);
        name = name.trim_end().to_string();
    }
    for suffix in CHANNEL_SUFFIXES {
        if let Some(stripped) = strip_suffix_ci(&name, suffix) {
            if !stripped.is_empty() {
                name = stripped;
            }
        }
    }

    // 2. Tier descriptors can stack ("Premium with Ads")
    loop {
        let mut stripped_any = false;
        for suffix in TIER_SUFFIXES {
            if let Some(stripped) = strip_suffix_ci(&name, suffix) {
                if !stripped.is_empty() {
                    name = stripped;
                    stripped_any = true;
                }
            }
        }
        if !stripped_any {
            break;
        }
    }

    // 3. Brand spellings
    let lower = name.to_lowercase();
    for (pattern, canonical) in BRAND_TABLE {
        if lower == *pattern {
            return canonical.to_string();
        }
    }

    name
}

fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    haystack.to_lowercase().find(&needle.to_lowercase())
}

/// Strip `suffix` off the end of `name` (case-insensitive, whole-word),
/// returning the trimmed remainder.
fn strip_suffix_ci(name: &str, suffix: &str) -> Option<String> {
    let lower = name.to_lowercase();
    if !lower.ends_with(suffix) {
        return None;
    }
    let cut = name.len() - suffix.len();
    // Whole-word: the character before the suffix must be a space
    if cut > 0 && !name[..cut].ends_with(' ') {
        return None;
    }
    Some(name[..cut].trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_via_addon_suffix() {
        assert_eq!(normalize_provider("Max via Prime Video"), "Max");
        assert_eq!(normalize_provider("MUBI via Amazon Prime"), "MUBI");
    }

    #[test]
    fn test_strips_channel_suffixes() {
        assert_eq!(normalize_provider("Paramount+ Amazon Channel"), "Paramount+");
        assert_eq!(normalize_provider("AMC+ Roku Premium Channel"), "AMC+");
        assert_eq!(normalize_provider("Starz Apple TV Channel"), "Starz");
    }

    #[test]
    fn test_strips_tier_descriptors() {
        assert_eq!(normalize_provider("Netflix Standard with Ads"), "Netflix");
        assert_eq!(normalize_provider("Netflix basic"), "Netflix");
        assert_eq!(normalize_provider("Peacock Premium"), "Peacock");
    }

    #[test]
    fn test_brand_spellings_unify() {
        assert_eq!(normalize_provider("Paramount Plus"), "Paramount+");
        assert_eq!(normalize_provider("Disney Plus"), "Disney+");
        assert_eq!(normalize_provider("Apple TV Plus"), "Apple TV+");
        assert_eq!(normalize_provider("HBO Max"), "Max");
    }

    #[test]
    fn test_rules_compose() {
        assert_eq!(normalize_provider("Paramount Plus Amazon Channel"), "Paramount+");
        assert_eq!(normalize_provider("Disney Plus with Ads"), "Disney+");
    }

    #[test]
    fn test_untouched_names_pass_through() {
        assert_eq!(normalize_provider("Netflix"), "Netflix");
        assert_eq!(normalize_provider("MUBI"), "MUBI");
        assert_eq!(normalize_provider("Criterion Channel"), "Criterion Channel");
    }

    #[test]
    fn test_whole_word_suffix_matching() {
        // "Premium" only strips as its own word
        assert_eq!(normalize_provider("FilmPremium"), "FilmPremium");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Netflix",
            "Netflix Standard with Ads",
            "Paramount+ Amazon Channel",
            "Paramount Plus",
            "Max via Prime Video",
            "HBO Max",
            "Criterion Channel",
            "Peacock Premium",
        ];
        for raw in samples {
            let once = normalize_provider(raw);
            assert_eq!(normalize_provider(&once), once, "not idempotent for {raw:?}");
        }
    }
}
