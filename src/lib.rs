//! Skimmer: a polite site scraper and bulk document ingestor
//!
//! This crate implements a domain-scoped breadth-first crawler that extracts
//! structured content from each fetched page and streams the resulting
//! documents into a bulk storage sink.

pub mod config;
pub mod crawler;
pub mod output;
pub mod scrape;
pub mod sink;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for skimmer operations
#[derive(Debug, Error)]
pub enum SkimmerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Scrape error for {url}: {message}")]
    Scrape { url: String, message: String },

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid tag selector: {0}")]
    InvalidSelector(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to resolve URL reference: {0}")]
    Resolve(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Errors produced by the bulk ingestion sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Sink host address is missing")]
    MissingHost,

    #[error("Sink index name is missing")]
    MissingIndex,

    #[error("Sink document type is missing")]
    MissingDocType,

    #[error("Document count must be positive")]
    NonPositiveCount,

    #[error("Bulk commit failed: {0}")]
    BulkCommit(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Sink request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for skimmer operations
pub type Result<T> = std::result::Result<T, SkimmerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Settings;
pub use crawler::{CrawlReport, Runner, RunnerConfig};
pub use scrape::Document;
pub use state::DedupSet;
pub use url::{normalize, registrable_domain, ScopeRules};
