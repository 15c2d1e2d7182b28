use async_trait::async_trait;
use film_scan_config::ScanConfig;
use film_scan_models::FilmRecord;
use reqwest::{header, Client, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::letterboxd::parser;
use crate::traits::FilmListSource;

const LETTERBOXD_BASE: &str = "https://letterboxd.com";

/// Identification sent on the blocked-page retry. The first attempt goes
/// out with the plain client UA; only a challenge response escalates.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Outcome of fetching one list page.
enum PageFetch {
    Content(String),
    /// Challenge page or a status the site uses for bot defense.
    Blocked,
    /// Any other non-success status; pagination stops here.
    Gone(StatusCode),
}

pub struct LetterboxdClient {
    http: Client,
    username: String,
    base_url: String,
    max_pages: u32,
    page_delay: Duration,
}

impl LetterboxdClient {
    pub fn new(username: String, scan: &ScanConfig) -> Result<Self, SourceError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            username,
            base_url: LETTERBOXD_BASE.to_string(),
            max_pages: scan.max_pages,
            page_delay: Duration::from_millis(scan.page_delay_ms),
        })
    }

    fn watchlist_url(&self) -> String {
        format!("{}/{}/watchlist/", self.base_url, self.username)
    }

    fn watched_url(&self) -> String {
        format!("{}/{}/films/", self.base_url, self.username)
    }

    fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    async fn fetch_page(
        &self,
        url: &str,
        user_agent: Option<&str>,
    ) -> Result<PageFetch, SourceError> {
        let mut request = self.http.get(url);
        if let Some(ua) = user_agent {
            request = request.header(header::USER_AGENT, ua);
        }
        let response = request.send().await?;
        let status = response.status();

        if matches!(
            status,
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
        ) {
            return Ok(PageFetch::Blocked);
        }
        if !status.is_success() {
            return Ok(PageFetch::Gone(status));
        }

        let body = response.text().await?;
        if looks_like_challenge(&body) {
            return Ok(PageFetch::Blocked);
        }
        Ok(PageFetch::Content(body))
    }

    /// Fetch one page, escalating to a browser User-Agent once when the
    /// first attempt is blocked. `Ok(None)` means "still blocked": the
    /// caller keeps whatever it has accumulated.
    async fn fetch_page_tolerant(&self, url: &str) -> Result<Option<PageFetch>, SourceError> {
        match self.fetch_page(url, None).await? {
            PageFetch::Blocked => {
                debug!(url, "Blocked response, retrying with browser user agent");
                match self.fetch_page(url, Some(BROWSER_USER_AGENT)).await? {
                    PageFetch::Blocked => Ok(None),
                    other => Ok(Some(other)),
                }
            }
            other => Ok(Some(other)),
        }
    }

    /// Scrape a paginated film list, following the explicit next link
    /// until it disappears, a page stops resolving, or the page cap hits.
    ///
    /// Blocking mid-list is not fatal: the films accumulated so far are
    /// returned as a partial result. Only a transport failure of the
    /// first page surfaces as an error.
    async fn scrape_list(&self, first_url: String) -> Result<Vec<FilmRecord>, SourceError> {
        let mut films = Vec::new();
        let mut seen_slugs: HashSet<String> = HashSet::new();
        let mut next_url = Some(first_url);
        let mut page_count: u32 = 0;

        while let Some(url) = next_url.take() {
            page_count += 1;
            if page_count > self.max_pages {
                warn!(
                    max_pages = self.max_pages,
                    "Page cap reached, stopping pagination"
                );
                break;
            }

            debug!(url = %url, page = page_count, "Fetching list page");
            let fetched = match self.fetch_page_tolerant(&url).await {
                Ok(f) => f,
                Err(e) => {
                    if page_count == 1 {
                        return Err(e);
                    }
                    warn!(url = %url, error = %e, "Page fetch failed, returning partial list");
                    break;
                }
            };

            let body = match fetched {
                Some(PageFetch::Content(body)) => body,
                Some(PageFetch::Gone(status)) => {
                    debug!(url = %url, %status, "Non-success status, stopping pagination");
                    break;
                }
                Some(PageFetch::Blocked) | None => {
                    warn!(url = %url, "Still blocked after retry, returning partial list");
                    break;
                }
            };

            let parsed = parser::parse_list_page(&body);
            if parsed.films.is_empty() {
                debug!(url = %url, "No film entries on page, stopping");
                break;
            }

            for film in parsed.films {
                // Letterboxd pagination can repeat entries across pages
                if seen_slugs.insert(film.slug.clone()) {
                    films.push(film);
                }
            }

            next_url = parsed.next_path.map(|p| self.absolute_url(&p));
            if next_url.is_some() {
                sleep(self.page_delay).await;
            }
        }

        info!(
            user = %self.username,
            films = films.len(),
            pages = page_count,
            "List extraction finished"
        );
        Ok(films)
    }
}

fn looks_like_challenge(body: &str) -> bool {
    const MARKERS: &[&str] = &[
        "Just a moment",
        "cf-browser-verification",
        "cf-challenge",
        "Attention Required!",
        "Verifying you are human",
    ];
    MARKERS.iter().any(|m| body.contains(m))
}

#[async_trait]
impl FilmListSource for LetterboxdClient {
    fn source_name(&self) -> &str {
        "letterboxd"
    }

    async fn get_watchlist(&self) -> Result<Vec<FilmRecord>, SourceError> {
        self.scrape_list(self.watchlist_url()).await
    }

    async fn get_watched(&self) -> Result<Vec<FilmRecord>, SourceError> {
        self.scrape_list(self.watched_url()).await
    }
}
