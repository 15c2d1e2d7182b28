use film_scan_models::FilmRecord;
use scraper::{Html, Selector};

/// Films and pagination state parsed from one Letterboxd list page.
#[derive(Debug)]
pub struct ParsedPage {
    pub films: Vec<FilmRecord>,
    /// `href` of the explicit "next page" link, when present.
    pub next_path: Option<String>,
}

/// Parse one page of a Letterboxd film list (watched, watchlist, or
/// custom list).
///
/// Letterboxd serves two markup generations: classic poster grids
/// (`li.poster-container` with a `data-film-slug` poster div) and the
/// newer React islands (`div.react-component` carrying `data-item-slug`
/// and `data-item-name`, where the name ends in a parenthesized year).
/// Both are recognized; duplicate slugs across pages are the caller's
/// concern.
pub fn parse_list_page(html: &str) -> ParsedPage {
    let doc = Html::parse_document(html);

    let container_sel =
        Selector::parse("li.poster-container").expect("poster container selector is valid");
    let poster_sel = Selector::parse("div.poster").expect("poster selector is valid");
    let img_sel = Selector::parse("img").expect("img selector is valid");
    let year_sel = Selector::parse("span.year").expect("year selector is valid");
    let react_sel =
        Selector::parse("div.react-component").expect("react component selector is valid");
    let next_sel = Selector::parse("a.next").expect("next link selector is valid");

    let mut films = Vec::new();

    for container in doc.select(&container_sel) {
        let slug = match container
            .select(&poster_sel)
            .next()
            .and_then(|p| p.value().attr("data-film-slug"))
        {
            Some(s) if !s.is_empty() => s,
            _ => continue,
        };

        let title = container
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("alt"))
            .unwrap_or("")
            .trim()
            .to_string();
        if title.is_empty() {
            continue;
        }

        let year = container
            .select(&year_sel)
            .next()
            .and_then(|y| y.text().collect::<String>().trim().parse().ok());

        films.push(FilmRecord::new(slug, title, year));
    }

    for component in doc.select(&react_sel) {
        let slug = match component.value().attr("data-item-slug") {
            Some(s) if !s.is_empty() => s,
            _ => continue,
        };

        let raw_name = component.value().attr("data-item-name").unwrap_or("");
        let (title, year) = split_title_year(raw_name);
        if title.is_empty() {
            continue;
        }

        films.push(FilmRecord::new(slug, title, year));
    }

    let next_path = doc
        .select(&next_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    ParsedPage { films, next_path }
}

/// Split a trailing parenthesized 4-digit year off a display name:
/// `"Heat (1995)"` becomes `("Heat", Some(1995))`.
pub fn split_title_year(raw: &str) -> (String, Option<u16>) {
    let trimmed = raw.trim();
    if trimmed.len() >= 6 && trimmed.ends_with(')') {
        // The suffix "(dddd)" is pure ASCII, so the split is on a char boundary.
        let (head, tail) = trimmed.split_at(trimmed.len() - 6);
        if tail.starts_with('(') && tail[1..5].bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(year) = tail[1..5].parse() {
                return (head.trim_end().to_string(), Some(year));
            }
        }
    }
    (trimmed.to_string(), None)
}
