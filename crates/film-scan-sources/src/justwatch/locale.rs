use tracing::debug;

pub const JUSTWATCH_BASE: &str = "https://www.justwatch.com";

/// URL vocabulary for one JustWatch country edition. The site localizes
/// its path segments, so `/us/search` becomes `/es/buscar` or `/de/Suche`
/// depending on the edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    /// Country path segment, e.g. `us`.
    pub path: String,
    /// Search page segment, e.g. `search` / `buscar`.
    pub search_segment: String,
    /// Movie page segment appearing in title URLs, e.g. `movie` / `pelicula`.
    pub movie_segment: String,
}

impl Locale {
    fn new(path: &str, search_segment: &str, movie_segment: &str) -> Self {
        Self {
            path: path.to_string(),
            search_segment: search_segment.to_string(),
            movie_segment: movie_segment.to_string(),
        }
    }

    /// Resolve the edition for an ISO alpha-2 country code. Unknown codes
    /// fall back to English segments under the code's own path, which is
    /// what JustWatch serves for most smaller markets.
    pub fn for_country(code: &str) -> Self {
        let lower = code.to_lowercase();
        match lower.as_str() {
            "us" | "ca" | "au" => Self::new(&lower, "search", "movie"),
            "gb" | "uk" => Self::new("uk", "search", "movie"),
            "es" => Self::new("es", "buscar", "pelicula"),
            "mx" | "ar" | "co" | "cl" => Self::new(&lower, "buscar", "pelicula"),
            "fr" => Self::new("fr", "recherche", "film"),
            "de" | "at" | "ch" => Self::new(&lower, "Suche", "Film"),
            "it" => Self::new("it", "cerca", "film"),
            "jp" => Self::new("jp", "検索", "映画"),
            other => {
                debug!(country = other, "No locale mapping, using English segments");
                Self::new(other, "search", "movie")
            }
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/{}/{}?q={}",
            JUSTWATCH_BASE,
            self.path,
            self.search_segment,
            urlencoding::encode(query)
        )
    }
}

/// Vocabulary marking an offer as subscription/flat-rate across the
/// supported editions (EN/ES/FR/DE/IT/JA).
const FLATRATE_KEYWORDS: &[&str] = &[
    "stream",
    "flatrate",
    "flat rate",
    "subscription",
    "abo",
    "abonnement",
    "suscripción",
    "abbonamento",
    "定額",
    "見放題",
];

/// Vocabulary marking an offer as rental or purchase; matching any of
/// these disqualifies a row even when a flat-rate keyword also matches.
const RENT_BUY_KEYWORDS: &[&str] = &[
    "rent",
    "buy",
    "purchase",
    "alquil",
    "comprar",
    "compra",
    "location",
    "louer",
    "achat",
    "acheter",
    "leihen",
    "kaufen",
    "noleggio",
    "acquist",
    "レンタル",
    "購入",
];

/// Classify one offer row from its CSS classes and its visible label.
/// Container tokens like `buybox-row` are ignored so their substrings
/// cannot collide with the keyword lists.
pub fn is_streaming_offer(row_classes: &str, label: &str) -> bool {
    let meta: Vec<&str> = row_classes
        .split_whitespace()
        .filter(|token| !token.contains("buybox"))
        .collect();
    let haystack = format!("{} {}", meta.join(" "), label).to_lowercase();

    let flatrate = FLATRATE_KEYWORDS.iter().any(|k| haystack.contains(k));
    let rent_buy = RENT_BUY_KEYWORDS.iter().any(|k| haystack.contains(k));
    flatrate && !rent_buy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_locales() {
        assert_eq!(Locale::for_country("US").path, "us");
        assert_eq!(Locale::for_country("ES").search_segment, "buscar");
        assert_eq!(Locale::for_country("ES").movie_segment, "pelicula");
        assert_eq!(Locale::for_country("FR").search_segment, "recherche");
        assert_eq!(Locale::for_country("DE").search_segment, "Suche");
        assert_eq!(Locale::for_country("IT").search_segment, "cerca");
        assert_eq!(Locale::for_country("JP").movie_segment, "映画");
        // uk alias
        assert_eq!(Locale::for_country("GB").path, "uk");
    }

    #[test]
    fn test_unknown_country_falls_back_to_english_segments() {
        let locale = Locale::for_country("PT");
        assert_eq!(locale.path, "pt");
        assert_eq!(locale.search_segment, "search");
        assert_eq!(locale.movie_segment, "movie");
    }

    #[test]
    fn test_search_url_escapes_query() {
        let locale = Locale::for_country("US");
        assert_eq!(
            locale.search_url("Gone with the Wind 1939"),
            "https://www.justwatch.com/us/search?q=Gone%20with%20the%20Wind%201939"
        );
    }

    #[test]
    fn test_streaming_classification_by_row_class() {
        assert!(is_streaming_offer("buybox-row stream", ""));
        assert!(!is_streaming_offer("buybox-row rent", ""));
        assert!(!is_streaming_offer("buybox-row buy", ""));
        // Container token alone must not classify either way
        assert!(!is_streaming_offer("buybox-row", ""));
    }

    #[test]
    fn test_streaming_classification_by_label() {
        assert!(is_streaming_offer("", "Stream"));
        assert!(is_streaming_offer("", "Abonnement"));
        assert!(is_streaming_offer("", "Suscripción"));
        assert!(is_streaming_offer("", "定額制で見る"));
        assert!(!is_streaming_offer("", "Alquilar"));
        assert!(!is_streaming_offer("", "Kaufen"));
        assert!(!is_streaming_offer("", "レンタル"));
    }

    #[test]
    fn test_rent_buy_keywords_disqualify() {
        // A row mentioning both is not a flat-rate offer
        assert!(!is_streaming_offer("buybox-row stream", "Subscription or rent"));
    }
}
