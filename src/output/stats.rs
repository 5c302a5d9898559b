//! End-of-run reporting
//!
//! Aggregates the per-seed crawl reports and the ingestion report into one
//! summary, printed to stdout regardless of how many individual errors
//! occurred along the way.

use crate::crawler::CrawlReport;
use crate::sink::IngestReport;

/// Totals across every seed crawl in one ETL run
#[derive(Debug, Clone, Default)]
pub struct EtlSummary {
    /// Documents scraped across all seeds
    pub documents: usize,

    /// URLs whose fetch or scrape failed
    pub bad_links: usize,

    /// Admission attempts rejected as duplicates
    pub duplicates: u64,

    /// Distinct canonical URLs admitted across all seeds
    pub unique_urls: usize,

    /// Total crawl wall-clock time in seconds
    pub crawl_seconds: f64,
}

impl EtlSummary {
    /// Creates an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one crawl's report into the totals
    pub fn absorb(&mut self, report: &CrawlReport) {
        self.documents += report.documents.len();
        self.bad_links += report.bad_links.len();
        self.duplicates += report.duplicates;
        self.unique_urls += report.unique_urls.len();
        self.crawl_seconds += report.elapsed.as_secs_f64();
    }
}

/// Prints the run summary to stdout
pub fn print_summary(summary: &EtlSummary, ingest: Option<&IngestReport>) {
    println!("=== Run Summary ===\n");

    println!("Crawl:");
    println!("  Documents scraped: {}", summary.documents);
    println!("  Bad links: {}", summary.bad_links);
    println!("  Duplicates caught: {}", summary.duplicates);
    println!("  Unique URLs seen: {}", summary.unique_urls);
    println!("  Crawl time: {:.1}s", summary.crawl_seconds);

    if let Some(report) = ingest {
        println!();
        println!("Ingestion:");
        println!("  Documents indexed: {}", report.indexed);
        println!("  Bulk batches: {}", report.batches);
        println!(
            "  Throughput: {:.1} docs/sec over {:.1}s",
            report.docs_per_sec(),
            report.elapsed.as_secs_f64()
        );
    }
}
