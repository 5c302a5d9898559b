//! Bulk ingestion sink
//!
//! The sink is an external collaborator exposing a bulk-index capability;
//! this module holds the HTTP client for it and the producer/consumer
//! pipeline that streams finished documents into it in batches.

mod bulk;
mod pipeline;

pub use bulk::{HttpSink, BULK_BATCH_SIZE};
pub use pipeline::{ingest, IngestReport};
