//! Page scraping module
//!
//! Turns a fetched HTML body into a structured [`Document`] record: title and
//! meta description from `<head>`, text content gathered from a configurable
//! tag set within `<body>`, and a coarse hostname-derived classification tag.

mod extract;

pub use extract::{extract, page_tag};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A scraped page record, the unit shipped to the bulk sink
///
/// Created by the content extractor when a successful HTML response arrives
/// and appended once to the runner's result collection. Immutable afterwards,
/// except for `id`, which stays empty until the ingestion pipeline assigns
/// one.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Unique identifier, assigned at ingestion time
    pub id: String,

    /// Text of the first `<title>` element, whitespace-collapsed
    pub title: String,

    /// Content of the first `<meta name="description">`, whitespace-collapsed
    pub description: String,

    /// Concatenated text pulled from the configured tag set within `<body>`
    pub content: String,

    /// Canonical absolute URL of the source page
    pub link: String,

    /// Coarse classification label derived from the page's hostname
    pub tag: String,

    /// Timestamp of successful retrieval
    pub fetched_at: DateTime<Utc>,
}
