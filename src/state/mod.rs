//! Shared mutable crawl state
//!
//! The deduplication set is the only state written by concurrent workers
//! during a crawl run; it lives here, owned by the runner and shared by
//! reference with the response handlers.

mod dedup;

pub use dedup::DedupSet;
