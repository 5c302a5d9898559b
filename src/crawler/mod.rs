//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and failure classification
//! - The per-host fetch queue with politeness delays and lifecycle control
//! - The runner that wires fetches to scraping and link discovery

mod fetcher;
mod queue;
mod runner;

pub use fetcher::{
    build_http_client, perform, FailureKind, FetchFailure, FetchOutcome, FetchSuccess, Method,
};
pub use queue::{CompletedFetch, FetchQueue, QueueConfig, QueueHandle, TaskGuard};
pub use runner::{CrawlReport, Runner, RunnerConfig};
