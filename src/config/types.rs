use serde::Deserialize;

/// Top-level settings document for one ETL run
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub sink: SinkSettings,
    pub runner: RunnerSettings,
    #[serde(default)]
    pub seeds: Vec<SeedEntry>,
}

/// Address of the bulk document sink
#[derive(Debug, Clone, Deserialize)]
pub struct SinkSettings {
    /// Base URL of the sink service
    pub host: String,

    /// Index name documents are committed into
    pub index: String,

    /// Document type name within the index
    #[serde(rename = "doc-type")]
    pub doc_type: String,
}

/// Runner behavior knobs, shared by every seed
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSettings {
    /// Politeness delay between consecutive requests to the same host
    #[serde(rename = "crawl-delay-ms", default = "default_crawl_delay_ms")]
    pub crawl_delay_ms: u64,

    /// Cancel the crawl immediately after this many seconds (0 = disabled)
    #[serde(rename = "cancel-duration-secs", default)]
    pub cancel_duration_secs: u64,

    /// Cancel the crawl immediately once this URL's response is observed
    #[serde(rename = "cancel-at-url", default)]
    pub cancel_at_url: String,

    /// Stop admitting new links after this many seconds, draining the rest
    /// of the queue (0 = disabled)
    #[serde(rename = "stop-duration-secs", default)]
    pub stop_duration_secs: u64,

    /// Stop admitting new links once this URL's response is observed
    #[serde(rename = "stop-at-url", default)]
    pub stop_at_url: String,

    /// Log crawl progress at this interval (0 = disabled)
    #[serde(rename = "stats-interval-secs", default)]
    pub stats_interval_secs: u64,

    /// User agent string sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Time-to-live for an idle per-host worker
    #[serde(rename = "worker-idle-ttl-ms", default = "default_worker_idle_ttl_ms")]
    pub worker_idle_ttl_ms: u64,

    /// Terminate the run after one idle TTL once the frontier drains
    #[serde(rename = "auto-close", default = "default_true")]
    pub auto_close: bool,

    /// Maximum number of documents to scrape; 0 means unlimited.
    /// Negative values are rejected by validation.
    #[serde(rename = "max-documents", default)]
    pub max_documents: i64,
}

/// One crawl seed with its scope toggles and tag list
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Root URL the crawl starts from
    pub link: String,

    /// Tag selectors to scrape content from (empty = default `p` + `div`)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Confine the crawl to subdomains of the seed's registrable domain
    #[serde(default)]
    pub subdomain: bool,

    /// Confine the crawl to the seed's registrable domain
    #[serde(rename = "top-level-domain", default)]
    pub top_level_domain: bool,
}

fn default_crawl_delay_ms() -> u64 {
    1000
}

fn default_worker_idle_ttl_ms() -> u64 {
    30_000
}

fn default_user_agent() -> String {
    format!("skimmer/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}
