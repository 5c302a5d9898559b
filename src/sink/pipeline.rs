use crate::scrape::Document;
use crate::sink::bulk::{HttpSink, BULK_BATCH_SIZE};
use crate::SinkError;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Report of one ingestion run
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Documents committed to the sink
    pub indexed: usize,

    /// Bulk requests issued, including the final partial batch
    pub batches: usize,

    /// Wall-clock duration of the ingestion
    pub elapsed: Duration,
}

impl IngestReport {
    /// Ingestion throughput in documents per second
    pub fn docs_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return self.indexed as f64;
        }
        self.indexed as f64 / secs
    }
}

/// Streams documents into the sink in batches
///
/// A producer task feeds the documents through a bounded channel; the
/// consumer assigns any missing identifiers, accumulates batches of
/// [`BULK_BATCH_SIZE`], commits each, and flushes the final partial batch.
/// Batches already committed are not rolled back when a later one fails.
pub async fn ingest(sink: &HttpSink, documents: Vec<Document>) -> Result<IngestReport, SinkError> {
    if documents.is_empty() {
        return Err(SinkError::NonPositiveCount);
    }

    let started = Instant::now();
    let total = documents.len();
    tracing::info!(total, "starting ingestion");

    let (tx, mut rx) = mpsc::channel::<Document>(BULK_BATCH_SIZE);
    let producer = tokio::spawn(async move {
        for document in documents {
            if tx.send(document).await.is_err() {
                break;
            }
        }
    });

    let mut batch: Vec<Document> = Vec::with_capacity(BULK_BATCH_SIZE.min(total));
    let mut sequence = 0usize;
    let mut indexed = 0usize;
    let mut batches = 0usize;

    while let Some(mut document) = rx.recv().await {
        if document.id.is_empty() {
            document.id = derive_id(sequence, &document.link);
        }
        sequence += 1;
        batch.push(document);

        if batch.len() >= BULK_BATCH_SIZE {
            sink.bulk_index(&batch).await?;
            indexed += batch.len();
            batches += 1;
            tracing::info!(indexed, total, "bulk batch committed");
            batch.clear();
        }
    }

    if !batch.is_empty() {
        sink.bulk_index(&batch).await?;
        indexed += batch.len();
        batches += 1;
    }

    let _ = producer.await;

    let report = IngestReport {
        indexed,
        batches,
        elapsed: started.elapsed(),
    };
    tracing::info!(
        indexed = report.indexed,
        batches = report.batches,
        docs_per_sec = report.docs_per_sec(),
        "ingestion finished"
    );
    Ok(report)
}

/// Derives a sequence-based unique identifier for a document
fn derive_id(sequence: usize, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sequence.to_be_bytes());
    hasher.update(link.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}
