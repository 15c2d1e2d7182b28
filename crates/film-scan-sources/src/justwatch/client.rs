use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use which::which;

use crate::error::SourceError;
use crate::justwatch::locale::{is_streaming_offer, Locale, JUSTWATCH_BASE};
use crate::justwatch::matcher::pick_candidate;
use crate::traits::{OfferSource, TitleMatch};

/// How long a navigation may take before the check is abandoned.
const NAV_TIMEOUT: Duration = Duration::from_secs(30);
/// How long to poll for the offer listing before treating it as absent.
const SELECTOR_TIMEOUT: Duration = Duration::from_secs(10);
/// Poll interval while waiting for a selector.
const POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Settle time after navigation before querying the DOM.
const PAGE_SETTLE: Duration = Duration::from_secs(2);
/// Only this many search hits are considered per query.
const MAX_CANDIDATES: usize = 10;

/// One browser instance serves every (film, country) check of a scan
/// cycle: the session cookies survive between navigations, which keeps
/// the request pattern closer to a human visitor. [`shutdown`] must run
/// at cycle end regardless of how the cycle finished.
///
/// [`shutdown`]: JustWatchClient::shutdown
pub struct JustWatchClient {
    browser: Option<Browser>,
    handler_task: Option<tokio::task::JoinHandle<()>>,
    user_data_dir: PathBuf,
}

impl JustWatchClient {
    pub async fn new() -> Result<Self> {
        let user_data_dir = Self::get_user_data_dir()?;
        let (browser, handler_task) = Self::initialize_browser_internal(&user_data_dir).await?;

        Ok(Self {
            browser: Some(browser),
            handler_task: Some(handler_task),
            user_data_dir,
        })
    }

    async fn initialize_browser_internal(
        user_data_dir: &Path,
    ) -> Result<(Browser, tokio::task::JoinHandle<()>)> {
        let mut chrome_path = Self::find_system_chromium();

        // No system Chromium: download one via the fetcher
        if chrome_path.is_none() {
            info!("No system Chromium found, downloading via BrowserFetcher...");
            let fetcher_download_path = user_data_dir
                .parent()
                .ok_or_else(|| anyhow!("Could not determine parent directory"))?
                .join("chromium_downloads");
            tokio::fs::create_dir_all(&fetcher_download_path).await?;

            let fetcher = BrowserFetcher::new(
                BrowserFetcherOptions::builder()
                    .with_path(&fetcher_download_path)
                    .build()
                    .map_err(|e| anyhow!("Failed to create BrowserFetcherOptions: {}", e))?,
            );

            let fetched = fetcher
                .fetch()
                .await
                .map_err(|e| anyhow!("Failed to fetch Chromium: {}", e))?;
            chrome_path = Some(fetched.executable_path);
            info!("Chromium downloaded to: {:?}", chrome_path);
        }

        let config = Self::build_browser_config(chrome_path, user_data_dir)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        // Drain CDP messages; bail out if the browser process looks crashed
        let handler_task = tokio::spawn(async move {
            let mut error_count = 0;
            const MAX_ERRORS: usize = 10;

            while let Some(h) = handler.next().await {
                match h {
                    Ok(_) => {
                        error_count = 0;
                    }
                    Err(e) => {
                        error_count += 1;
                        warn!(
                            "Browser handler error (count: {}/{}): {:?}",
                            error_count, MAX_ERRORS, e
                        );
                        if error_count >= MAX_ERRORS {
                            error!(
                                "Browser handler received {} consecutive errors. Browser process may have crashed.",
                                error_count
                            );
                            break;
                        }
                    }
                }
            }

            debug!("Browser handler task ended");
        });

        Ok((browser, handler_task))
    }

    fn is_docker() -> bool {
        std::path::Path::new("/.dockerenv").exists()
            || std::fs::read_to_string("/proc/self/cgroup")
                .ok()
                .map(|s| s.contains("docker") || s.contains("containerd"))
                .unwrap_or(false)
    }

    fn find_system_chromium() -> Option<PathBuf> {
        let system_paths = [
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/local/bin/chromium",
            "/usr/local/bin/chromium-browser",
            "/opt/chromium/chromium",
        ];

        for path in &system_paths {
            if std::path::Path::new(path).exists() {
                return Some(PathBuf::from(path));
            }
        }

        which("chromium")
            .or_else(|_| which("chromium-browser"))
            .or_else(|_| which("google-chrome"))
            .ok()
    }

    fn build_browser_config(
        chrome_path: Option<PathBuf>,
        user_data_dir: &Path,
    ) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();

        if let Some(path) = chrome_path {
            builder = builder.chrome_executable(path);
        }

        if Self::is_docker() {
            builder = builder
                .arg("--headless=new")
                .arg("--no-sandbox")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-gpu");
        }

        builder = builder
            .arg("--disable-extensions")
            .arg("--disable-notifications")
            .arg("--disable-sync")
            .arg("--disable-default-apps")
            .arg("--log-level=3")
            .arg("--window-size=1280,900")
            .arg(format!("--user-data-dir={}", user_data_dir.display()))
            .arg("--user-agent=Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36");

        builder
            .build()
            .map_err(|e| anyhow!("Failed to build browser config: {}", e))
    }

    fn get_user_data_dir() -> Result<PathBuf> {
        use film_scan_config::container_base_path;
        let container_base = container_base_path();
        if container_base.exists() {
            let user_data_dir = container_base.join("data").join("browser");
            std::fs::create_dir_all(&user_data_dir)?;
            return Ok(user_data_dir);
        }

        let base = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".local/share")))
            .ok_or_else(|| anyhow!("Could not determine user data directory"))?;

        let user_data_dir = base.join("streamscout").join("browser");
        std::fs::create_dir_all(&user_data_dir)?;
        Ok(user_data_dir)
    }

    /// Execute an operation against a freshly navigated page, closing the
    /// page on every path so a failed check cannot leak tabs.
    async fn with_page<F, R>(
        browser: &Browser,
        url: &str,
        operation: F,
    ) -> Result<R, SourceError>
    where
        F: for<'a> FnOnce(&'a Page) -> BoxFuture<'a, Result<R, SourceError>>,
    {
        let page = tokio::time::timeout(NAV_TIMEOUT, browser.new_page(url))
            .await
            .map_err(|_| SourceError::browser(format!("navigation to {} timed out", url)))?
            .map_err(|e| SourceError::browser(format!("failed to open {}: {}", url, e)))?;

        sleep(PAGE_SETTLE).await;

        let result = match Self::check_for_challenge(&page, url).await {
            Err(e) => Err(e),
            Ok(()) => operation(&page).await,
        };

        if let Err(e) = page.close().await {
            warn!("Failed to close page: {}", e);
        }

        result
    }

    async fn check_for_challenge(page: &Page, url: &str) -> Result<(), SourceError> {
        let content = page
            .content()
            .await
            .map_err(|e| SourceError::browser(format!("failed to read page content: {}", e)))?;

        const MARKERS: &[&str] = &[
            "Verifying you are human",
            "Just a moment",
            "cf-challenge",
            "Access denied",
        ];
        if MARKERS.iter().any(|m| content.contains(m)) {
            return Err(SourceError::Blocked(url.to_string()));
        }
        Ok(())
    }

    /// Poll for elements until the deadline; an empty result means the
    /// markup never appeared, which callers treat as "not found".
    async fn wait_for_elements(
        page: &Page,
        selector: &str,
        deadline: Duration,
    ) -> Vec<chromiumoxide::element::Element> {
        let started = std::time::Instant::now();
        loop {
            match page.find_elements(selector).await {
                Ok(elements) if !elements.is_empty() => return elements,
                Ok(_) => {}
                Err(e) => {
                    debug!(selector, "find_elements failed while polling: {}", e);
                }
            }
            if started.elapsed() >= deadline {
                debug!(selector, "Selector did not appear before deadline");
                return Vec::new();
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Collect search hits (anchor URL + visible text) from one search
    /// results page.
    async fn collect_candidates(
        &self,
        url: &str,
        locale: &Locale,
    ) -> Result<Vec<TitleMatch>, SourceError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| SourceError::browser("browser not initialized"))?;

        let anchor_selector = format!("a[href*=\"/{}/\"]", locale.movie_segment);

        Self::with_page(browser, url, |page| {
            async move {
                let anchors =
                    Self::wait_for_elements(page, &anchor_selector, SELECTOR_TIMEOUT).await;

                let mut candidates = Vec::new();
                let mut seen_urls = HashSet::new();
                for anchor in anchors.into_iter() {
                    if candidates.len() >= MAX_CANDIDATES {
                        break;
                    }
                    let href = match anchor.attribute("href").await {
                        Ok(Some(href)) if !href.is_empty() => href,
                        _ => continue,
                    };
                    let label = anchor
                        .inner_text()
                        .await
                        .ok()
                        .flatten()
                        .unwrap_or_default()
                        .trim()
                        .to_string();
                    if label.is_empty() {
                        continue;
                    }

                    let absolute = if href.starts_with('/') {
                        format!("{}{}", JUSTWATCH_BASE, href)
                    } else {
                        href
                    };
                    if seen_urls.insert(absolute.clone()) {
                        candidates.push(TitleMatch {
                            url: absolute,
                            label,
                        });
                    }
                }
                Ok(candidates)
            }
            .boxed()
        })
        .await
    }

    /// Explicitly shut down the browser instance. Called via
    /// [`OfferSource::cleanup`] when the scan cycle completes.
    pub async fn shutdown(&mut self) -> Result<()> {
        if let Some(mut browser) = self.browser.take() {
            info!("Shutting down browser instance");

            if let Err(e) = browser.close().await {
                warn!("Failed to close browser cleanly: {}", e);
            }

            if let Some(handler_task) = self.handler_task.take() {
                let _ = tokio::time::timeout(Duration::from_secs(2), handler_task).await;
            }

            drop(browser);
            info!("Browser instance shut down");
        }

        Ok(())
    }
}

impl Drop for JustWatchClient {
    fn drop(&mut self) {
        if self.browser.take().is_some() {
            // Browser process is reaped when the handle drops; an explicit
            // shutdown() beforehand is the clean path.
            debug!(
                "JustWatchClient dropped with live browser (user data at {:?})",
                self.user_data_dir
            );
        }
    }
}

#[async_trait]
impl OfferSource for JustWatchClient {
    fn source_name(&self) -> &str {
        "justwatch"
    }

    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
        country: &str,
    ) -> Result<Option<TitleMatch>, SourceError> {
        let locale = Locale::for_country(country);

        // Attempt 1 includes the year to narrow noisy titles; attempt 2
        // drops it for films the catalog dates differently.
        let mut queries = Vec::new();
        if let Some(y) = year {
            queries.push(format!("{} {}", title, y));
        }
        queries.push(title.to_string());

        for query in queries {
            let url = locale.search_url(&query);
            debug!(query = %query, country, "Searching catalog");
            let candidates = self.collect_candidates(&url, &locale).await?;
            if let Some(matched) = pick_candidate(&candidates, year) {
                debug!(url = %matched.url, "Validated catalog match");
                return Ok(Some(matched.clone()));
            }
        }

        Ok(None)
    }

    async fn extract_offers(
        &self,
        matched: &TitleMatch,
        country: &str,
    ) -> Result<Vec<String>, SourceError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| SourceError::browser("browser not initialized"))?;

        let url = matched.url.clone();
        let country = country.to_string();

        Self::with_page(browser, &url, |page| {
            async move {
                let rows = Self::wait_for_elements(page, "div.buybox-row", SELECTOR_TIMEOUT).await;
                if rows.is_empty() {
                    debug!(country = %country, "No offer listing on title page");
                    return Ok(Vec::new());
                }

                let mut providers = Vec::new();
                let mut seen = HashSet::new();

                for row in rows {
                    let classes = row
                        .attribute("class")
                        .await
                        .ok()
                        .flatten()
                        .unwrap_or_default();
                    let label = match row.find_element(".buybox-row__label").await {
                        Ok(el) => el.inner_text().await.ok().flatten().unwrap_or_default(),
                        Err(_) => String::new(),
                    };

                    if !is_streaming_offer(&classes, &label) {
                        continue;
                    }

                    // Provider names come from offer icon captions, with
                    // link titles as the fallback.
                    let mut names = Vec::new();
                    if let Ok(icons) = row.find_elements("img").await {
                        for icon in icons {
                            if let Ok(Some(alt)) = icon.attribute("alt").await {
                                names.push(alt);
                            }
                        }
                    }
                    if let Ok(links) = row.find_elements("a").await {
                        for link in links {
                            if let Ok(Some(title_attr)) = link.attribute("title").await {
                                names.push(title_attr);
                            }
                        }
                    }

                    for name in names {
                        let name = name.trim().to_string();
                        if name.is_empty() || name.to_lowercase().contains("justwatch") {
                            continue;
                        }
                        if seen.insert(name.clone()) {
                            providers.push(name);
                        }
                    }
                }

                Ok(providers)
            }
            .boxed()
        })
        .await
    }

    async fn cleanup(&mut self) -> Result<(), SourceError> {
        self.shutdown()
            .await
            .map_err(|e| SourceError::browser(format!("shutdown failed: {}", e)))
    }
}
