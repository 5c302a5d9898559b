use crate::config::SinkSettings;
use crate::scrape::Document;
use crate::SinkError;
use reqwest::Client;
use serde_json::json;

/// Number of documents committed per bulk request
pub const BULK_BATCH_SIZE: usize = 1000;

/// HTTP client for the external bulk document sink
///
/// Commits batches with `POST {host}/{index}/{doc-type}/_bulk`, sending
/// newline-delimited JSON action/source line pairs. The sink's response body
/// carries an `errors` flag when any item in the batch failed; that flag is
/// surfaced as a bulk-commit failure.
pub struct HttpSink {
    client: Client,
    host: String,
    index: String,
    doc_type: String,
}

impl HttpSink {
    /// Creates a sink client, validating the address pieces
    ///
    /// Missing host, index, or document type are typed errors so the caller
    /// can fail before any crawling starts.
    pub fn new(settings: &SinkSettings) -> Result<Self, SinkError> {
        if settings.host.is_empty() {
            return Err(SinkError::MissingHost);
        }
        if settings.index.is_empty() {
            return Err(SinkError::MissingIndex);
        }
        if settings.doc_type.is_empty() {
            return Err(SinkError::MissingDocType);
        }

        Ok(Self {
            client: Client::new(),
            host: settings.host.trim_end_matches('/').to_string(),
            index: settings.index.clone(),
            doc_type: settings.doc_type.clone(),
        })
    }

    /// Commits one batch of documents
    ///
    /// Every document must already carry its identifier.
    pub async fn bulk_index(&self, batch: &[Document]) -> Result<(), SinkError> {
        if batch.is_empty() {
            return Err(SinkError::NonPositiveCount);
        }

        let mut payload = String::new();
        for document in batch {
            let action = json!({
                "index": {
                    "_index": self.index,
                    "_type": self.doc_type,
                    "_id": document.id,
                }
            });
            payload.push_str(&serde_json::to_string(&action)?);
            payload.push('\n');
            payload.push_str(&serde_json::to_string(document)?);
            payload.push('\n');
        }

        let url = format!("{}/{}/{}/_bulk", self.host, self.index, self.doc_type);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::BulkCommit(format!(
                "sink returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&body) {
            if parsed
                .get("errors")
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
            {
                return Err(SinkError::BulkCommit(
                    "bulk response reported item failures".to_string(),
                ));
            }
        }

        Ok(())
    }
}
