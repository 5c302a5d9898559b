//! Crawl runner: the top-level state machine for one crawl run
//!
//! The runner owns the immutable run configuration and the shared mutable
//! state (dedup set, result collection, bad-link list), wires the queue's
//! completed fetches to the content extractor and the link classifier, and
//! enforces the document cap and the stop/cancel triggers.

use crate::config::{RunnerSettings, SeedEntry};
use crate::crawler::fetcher::{build_http_client, Method};
use crate::crawler::queue::{CompletedFetch, FetchQueue, QueueConfig, QueueHandle};
use crate::scrape::{self, Document};
use crate::state::DedupSet;
use crate::url::{canonicalize, normalize, ScopeRules};
use crate::{ConfigError, SkimmerError};
use scraper::{Html, Selector};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Immutable configuration for one crawl run
///
/// Owned exclusively by the [`Runner`]; handlers borrow it and never mutate
/// it.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Canonical seed URL the crawl starts from
    pub seed: Url,

    /// Tag selectors for content extraction (empty = default `p` + `div`)
    pub tags: Vec<String>,

    /// Scope confinement rules for discovered links
    pub scope: ScopeRules,

    /// Politeness delay between consecutive requests to the same host
    pub crawl_delay: Duration,

    /// Time-to-live for an idle per-host worker
    pub worker_idle_ttl: Duration,

    /// Terminate the run after one idle TTL once the frontier drains
    pub auto_close: bool,

    /// User agent string sent with every request
    pub user_agent: String,

    /// Maximum number of documents to scrape; 0 means unlimited
    pub max_documents: u64,

    /// Gracefully stop after this long
    pub stop_duration: Option<Duration>,

    /// Gracefully stop once this URL's response is observed
    pub stop_at_url: Option<String>,

    /// Cancel immediately after this long
    pub cancel_duration: Option<Duration>,

    /// Cancel immediately once this URL's response is observed
    pub cancel_at_url: Option<String>,

    /// Log crawl progress at this interval
    pub stats_interval: Option<Duration>,
}

impl RunnerConfig {
    /// Builds a run configuration from the settings document and one seed
    ///
    /// The seed is canonicalized the same way discovered links are, so the
    /// dedup key and the fetch target stay identical. A negative document
    /// cap is rejected here, before any network activity.
    pub fn from_settings(runner: &RunnerSettings, seed: &SeedEntry) -> Result<Self, SkimmerError> {
        if runner.max_documents < 0 {
            return Err(ConfigError::Validation(format!(
                "max-documents cannot be negative, got {}",
                runner.max_documents
            ))
            .into());
        }

        let parsed = Url::parse(&seed.link)?;
        let canonical = canonicalize(&parsed)?;

        Ok(Self {
            seed: canonical,
            tags: seed.tags.clone(),
            scope: ScopeRules {
                top_level_domain: seed.top_level_domain,
                subdomain: seed.subdomain,
            },
            crawl_delay: Duration::from_millis(runner.crawl_delay_ms),
            worker_idle_ttl: Duration::from_millis(runner.worker_idle_ttl_ms),
            auto_close: runner.auto_close,
            user_agent: runner.user_agent.clone(),
            max_documents: runner.max_documents as u64,
            stop_duration: non_zero_secs(runner.stop_duration_secs),
            stop_at_url: non_empty(&runner.stop_at_url),
            cancel_duration: non_zero_secs(runner.cancel_duration_secs),
            cancel_at_url: non_empty(&runner.cancel_at_url),
            stats_interval: non_zero_secs(runner.stats_interval_secs),
        })
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Results of one crawl run
#[derive(Debug)]
pub struct CrawlReport {
    /// Documents scraped, in completion order
    pub documents: Vec<Document>,

    /// URLs whose fetch or scrape failed
    pub bad_links: Vec<String>,

    /// Admission attempts rejected as duplicates
    pub duplicates: u64,

    /// Every distinct canonical URL admitted during the run
    pub unique_urls: Vec<String>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Shared mutable state for one run, written by the response handlers
struct CrawlState {
    dedup: DedupSet,
    documents: Mutex<Vec<Document>>,
    bad_links: Mutex<Vec<String>>,
}

/// Runs a single crawl from one seed
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Creates a runner for the given configuration
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Runs the crawl to completion and returns the scraped documents
    ///
    /// The run ends when the frontier drains, a stop/cancel duration
    /// elapses, a stop/cancel URL is observed, or the document cap is
    /// reached.
    pub async fn crawl(&self) -> Result<CrawlReport, SkimmerError> {
        let started = std::time::Instant::now();
        tracing::info!(seed = %self.config.seed, "starting crawl run");

        let client = build_http_client(&self.config.user_agent)?;
        let queue_config = QueueConfig {
            crawl_delay: self.config.crawl_delay,
            worker_idle_ttl: self.config.worker_idle_ttl,
            auto_close: self.config.auto_close,
        };
        let (handle, mut completed) = FetchQueue::start(client, queue_config);

        let state = Arc::new(CrawlState {
            dedup: DedupSet::new(),
            documents: Mutex::new(Vec::new()),
            bad_links: Mutex::new(Vec::new()),
        });

        let mut background = Vec::new();

        // Timed stop/cancel; the cancel variant wins when both are set.
        if let Some(after) = self.config.cancel_duration {
            let timer_handle = handle.clone();
            background.push(tokio::spawn(async move {
                tokio::time::sleep(after).await;
                tracing::info!("cancel duration elapsed, cancelling crawl");
                timer_handle.cancel();
            }));
        } else if let Some(after) = self.config.stop_duration {
            let timer_handle = handle.clone();
            background.push(tokio::spawn(async move {
                tokio::time::sleep(after).await;
                tracing::info!("stop duration elapsed, closing crawl");
                timer_handle.close();
            }));
        }

        // Periodic progress reporting.
        if let Some(interval) = self.config.stats_interval {
            let stats_handle = handle.clone();
            let stats_state = Arc::clone(&state);
            background.push(tokio::spawn(async move {
                loop {
                    tokio::time::sleep(interval).await;
                    let documents = stats_state.documents.lock().unwrap().len();
                    let bad_links = stats_state.bad_links.lock().unwrap().len();
                    tracing::info!(
                        documents,
                        bad_links,
                        pending = stats_handle.pending(),
                        "crawl progress"
                    );
                }
            }));
        }

        // Seed the dedup store before the first request goes out; the root
        // must never be re-discovered as a new link.
        state.dedup.try_admit(self.config.seed.as_str());
        handle.enqueue(Method::Get, self.config.seed.clone());

        // This loop is the run: it ends when the queue has shut down and
        // every completed fetch has been handled.
        while let Some(fetch) = completed.recv().await {
            self.handle_response(fetch, &handle, &state);
        }

        for task in background {
            task.abort();
        }

        let documents = std::mem::take(&mut *state.documents.lock().unwrap());
        let bad_links = std::mem::take(&mut *state.bad_links.lock().unwrap());
        let report = CrawlReport {
            documents,
            bad_links,
            duplicates: state.dedup.duplicates(),
            unique_urls: state.dedup.snapshot(),
            elapsed: started.elapsed(),
        };

        tracing::info!(
            documents = report.documents.len(),
            bad_links = report.bad_links.len(),
            duplicates = report.duplicates,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "crawl run finished"
        );

        Ok(report)
    }

    /// Routes one completed fetch by method, status, and content type
    fn handle_response(
        &self,
        fetch: CompletedFetch,
        handle: &QueueHandle,
        state: &Arc<CrawlState>,
    ) {
        let CompletedFetch { outcome, guard } = fetch;
        let url_string = outcome.url.as_str().to_string();

        // URL-triggered stop/cancel fires from its own task, never from the
        // handler's call stack, and the response itself is not processed.
        if let Some(cancel_at) = &self.config.cancel_at_url {
            if url_string == *cancel_at {
                tracing::info!(url = %url_string, "cancel URL observed");
                let trigger = handle.clone();
                tokio::spawn(async move { trigger.cancel() });
                return;
            }
        }
        if let Some(stop_at) = &self.config.stop_at_url {
            if url_string == *stop_at {
                tracing::info!(url = %url_string, "stop URL observed");
                let trigger = handle.clone();
                tokio::spawn(async move { trigger.close() });
                return;
            }
        }

        match outcome.result {
            Err(failure) => {
                tracing::warn!(
                    method = %outcome.method,
                    url = %url_string,
                    error = %failure.message,
                    "fetch failed"
                );
                state.bad_links.lock().unwrap().push(url_string);
            }
            Ok(success) => {
                if success.status != 200 {
                    tracing::debug!(
                        status = success.status,
                        method = %outcome.method,
                        url = %url_string,
                        "non-200 response"
                    );
                    state.bad_links.lock().unwrap().push(url_string);
                } else if outcome.method == Method::Get && success.is_html() {
                    let body = match &success.body {
                        Some(body) => body.as_str(),
                        None => "",
                    };
                    self.scrape_page(body, &outcome.url, handle, state);
                    self.discover_links(body, &outcome.url, handle, state);
                } else if outcome.method == Method::Head
                    && success.is_html()
                    && outcome.url.host_str() == self.config.seed.host_str()
                {
                    // Seed-host pages checked via HEAD are promoted to GET.
                    handle.enqueue(Method::Get, outcome.url.clone());
                } else {
                    tracing::debug!(
                        method = %outcome.method,
                        url = %url_string,
                        content_type = %success.content_type,
                        "response dropped"
                    );
                }
            }
        }

        drop(guard);
    }

    /// Extracts a document from a fetched page, honoring the document cap
    fn scrape_page(&self, body: &str, url: &Url, handle: &QueueHandle, state: &Arc<CrawlState>) {
        let cap = self.config.max_documents;

        {
            let documents = state.documents.lock().unwrap();
            if cap > 0 && documents.len() as u64 >= cap {
                tracing::info!(size = documents.len(), "document cap reached, cancelling");
                let trigger = handle.clone();
                tokio::spawn(async move { trigger.cancel() });
                return;
            }
        }

        match scrape::extract(body, url, &self.config.tags) {
            Ok(document) => {
                let total = {
                    let mut documents = state.documents.lock().unwrap();
                    documents.push(document);
                    documents.len()
                };
                tracing::info!(total, url = %url, "page scraped");

                if cap > 0 && total as u64 >= cap {
                    tracing::info!(size = total, "document cap reached, cancelling");
                    let trigger = handle.clone();
                    tokio::spawn(async move { trigger.cancel() });
                }
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "scrape failed");
                state.bad_links.lock().unwrap().push(url.to_string());
            }
        }
    }

    /// Classifies and admits every outbound link on a fetched page
    fn discover_links(&self, body: &str, page: &Url, handle: &QueueHandle, state: &Arc<CrawlState>) {
        let selector = match Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return,
        };

        let root_host = match self.config.seed.host_str() {
            Some(host) => host,
            None => return,
        };

        let dom = Html::parse_document(body);
        for element in dom.select(&selector) {
            let href = match element.value().attr("href") {
                Some(href) => href,
                None => continue,
            };

            let candidate = match normalize(href, page) {
                Ok(Some(url)) => url,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(href, error = %e, "failed to resolve link");
                    continue;
                }
            };

            let host = match candidate.host_str() {
                Some(host) => host,
                None => continue,
            };

            if !self.config.scope.accepts(host, root_host) {
                tracing::debug!(host, root = root_host, "link out of crawl scope");
                continue;
            }

            if state.dedup.try_admit(candidate.as_str()) {
                handle.enqueue(Method::Head, candidate);
            }
        }
    }
}
