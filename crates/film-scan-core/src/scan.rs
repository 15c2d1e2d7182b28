use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use film_scan_models::{FilmMetadata, FilmRecord, OfferRow};
use film_scan_sources::{FilmListSource, MetadataSource, OfferSource, ProgressTracker};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::history::HistoryStore;
use crate::merge::{merge_incremental, prune_rows};
use crate::normalize::normalize_provider;
use crate::resolve::resolve_unwatched;
use crate::store::OfferStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Re-check every current watchlist film; the produced rows replace
    /// the persisted table outright.
    Full,
    /// Check only films never scanned before; results merge into the
    /// pruned existing table.
    Incremental,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Full => write!(f, "full"),
            ScanMode::Incremental => write!(f, "incremental"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Countries checked per film, in order (ISO alpha-2).
    pub countries: Vec<String>,
    /// Weekday that forces a full scan (the 1st of the month always does).
    pub full_scan_weekday: Weekday,
    /// Whether full scans subtract the watched list from the target set.
    pub compare_watched: bool,
    /// Force a full scan regardless of the calendar.
    pub force_full: bool,
    /// Politeness delay between (film, country) checks.
    pub task_delay: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            countries: vec!["US".to_string()],
            full_scan_weekday: Weekday::Mon,
            compare_watched: true,
            force_full: false,
            task_delay: Duration::from_millis(1500),
        }
    }
}

pub struct ScanResult {
    pub mode: ScanMode,
    pub watchlist_films: usize,
    pub films_scanned: usize,
    pub rows_written: usize,
    pub duration: Duration,
    pub errors: Vec<String>,
}

/// One unit of catalog work. Kept as an explicit queue so backoff or
/// future parallelization slot in without touching the loop body.
struct ScanTask {
    film: FilmRecord,
    country: String,
}

/// Drives one scan cycle: extract lists, resolve the target set, walk the
/// (country × film) queue through the catalog matcher, then merge, prune
/// and persist. Sources are trait objects so every stage can be stubbed.
pub struct ScanOrchestrator {
    list_source: Box<dyn FilmListSource>,
    offer_source: Box<dyn OfferSource>,
    metadata_source: Box<dyn MetadataSource>,
    offer_store: OfferStore,
    history_store: HistoryStore,
    options: ScanOptions,
}

impl ScanOrchestrator {
    pub fn new(
        list_source: Box<dyn FilmListSource>,
        offer_source: Box<dyn OfferSource>,
        metadata_source: Box<dyn MetadataSource>,
        offer_store: OfferStore,
        history_store: HistoryStore,
    ) -> Self {
        Self {
            list_source,
            offer_source,
            metadata_source,
            offer_store,
            history_store,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// FULL on the designated weekday and on the 1st of the month.
    pub fn decide_mode(today: NaiveDate, full_scan_weekday: Weekday) -> ScanMode {
        if today.weekday() == full_scan_weekday || today.day() == 1 {
            ScanMode::Full
        } else {
            ScanMode::Incremental
        }
    }

    #[instrument(skip(self))]
    pub async fn scan(&mut self) -> Result<ScanResult> {
        self.scan_on(Utc::now().date_naive()).await
    }

    /// Run one cycle dated `today`. The offer source is cleaned up on
    /// every exit path so the browser session never outlives the cycle.
    pub async fn scan_on(&mut self, today: NaiveDate) -> Result<ScanResult> {
        let mut result = self.run_cycle(today).await;

        if let Err(e) = self.offer_source.cleanup().await {
            warn!(error = %e, "Failed to clean up offer source");
            if let Ok(ref mut scan_result) = result {
                scan_result
                    .errors
                    .push(format!("Failed to clean up offer source: {}", e));
            }
        }

        result
    }

    async fn run_cycle(&mut self, today: NaiveDate) -> Result<ScanResult> {
        let start = Instant::now();
        let mut errors = Vec::new();

        info!(
            operation = "scan_start",
            countries = ?self.options.countries,
            "Starting scan cycle"
        );

        // A dead watchlist fetch leaves nothing to do; this is the one
        // fatal failure inside a cycle.
        let watchlist = self
            .list_source
            .get_watchlist()
            .await
            .map_err(|e| anyhow::anyhow!("Watchlist fetch failed: {}", e))?;

        let mode = if self.options.force_full {
            ScanMode::Full
        } else {
            Self::decide_mode(today, self.options.full_scan_weekday)
        };

        let watched = if mode == ScanMode::Full && self.options.compare_watched {
            match self.list_source.get_watched().await {
                Ok(watched) => watched,
                Err(e) => {
                    warn!(error = %e, "Watched list fetch failed, scanning full watchlist");
                    errors.push(format!("Watched list fetch failed: {}", e));
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let history = self.history_store.load();

        let target: Vec<FilmRecord> = match mode {
            ScanMode::Full => resolve_unwatched(&watchlist, &watched),
            ScanMode::Incremental => watchlist
                .iter()
                .filter(|f| !history.contains(&f.scan_key()))
                .cloned()
                .collect(),
        };

        info!(
            mode = %mode,
            watchlist = watchlist.len(),
            watched = watched.len(),
            target = target.len(),
            "Scan target resolved"
        );

        let mut queue: VecDeque<ScanTask> = VecDeque::new();
        for country in &self.options.countries {
            for film in &target {
                queue.push_back(ScanTask {
                    film: film.clone(),
                    country: country.clone(),
                });
            }
        }

        let total_tasks = queue.len();
        let mut tracker =
            ProgressTracker::new(total_tasks, if total_tasks < 100 { 10 } else { 50 });
        let mut metadata_cache: HashMap<String, FilmMetadata> = HashMap::new();
        let mut new_rows: Vec<OfferRow> = Vec::new();
        let mut processed = 0;

        while let Some(task) = queue.pop_front() {
            processed += 1;

            // One metadata lookup per film, shared across countries
            let cache_key = task.film.scan_key();
            let metadata = match metadata_cache.get(&cache_key) {
                Some(metadata) => metadata.clone(),
                None => {
                    let metadata = self
                        .metadata_source
                        .lookup(&task.film.title, task.film.year)
                        .await;
                    metadata_cache.insert(cache_key, metadata.clone());
                    metadata
                }
            };

            let providers = self
                .offer_source
                .find_offers(&task.film.title, task.film.year, &task.country)
                .await;

            if providers.is_empty() {
                tracker.record_empty();
            } else {
                tracker.record_with_offers();
            }

            for raw_name in providers {
                let provider = normalize_provider(&raw_name);
                debug!(
                    title = %task.film.title,
                    country = %task.country,
                    provider = %provider,
                    "Offer found"
                );
                new_rows.push(OfferRow {
                    title: task.film.title.clone(),
                    year: task.film.year,
                    country: task.country.to_uppercase(),
                    provider,
                    poster_url: metadata.poster_url.clone(),
                    runtime: metadata.runtime,
                    last_updated: today,
                });
            }

            tracker.log_progress(processed);

            if !queue.is_empty() && !self.options.task_delay.is_zero() {
                sleep(self.options.task_delay).await;
            }
        }
        tracker.log_summary("Offer scan");

        // Two raw labels can normalize to the same provider; collapse
        // them before touching the persisted table.
        let new_rows = merge_incremental(Vec::new(), new_rows);

        let live_keys: HashSet<String> = watchlist.iter().map(|f| f.scan_key()).collect();
        let existing = self.offer_store.load();
        let pruned = prune_rows(existing, &live_keys);

        let final_rows = match mode {
            // A full scan is authoritative and supersedes old data
            ScanMode::Full => new_rows,
            ScanMode::Incremental => merge_incremental(pruned, new_rows),
        };

        self.offer_store.save(&final_rows)?;

        // History reflects the watchlist as of this cycle even when the
        // target set was empty.
        self.history_store.save(&live_keys)?;

        let duration = start.elapsed();
        info!(
            operation = "scan_complete",
            mode = %mode,
            duration_ms = duration.as_millis(),
            rows = final_rows.len(),
            errors = errors.len(),
            "Scan cycle completed"
        );

        Ok(ScanResult {
            mode,
            watchlist_films: watchlist.len(),
            films_scanned: target.len(),
            rows_written: final_rows.len(),
            duration,
            errors,
        })
    }
}
