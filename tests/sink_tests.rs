//! Integration tests for the bulk ingestion pipeline
//!
//! These tests point the HTTP sink at a wiremock server and verify the
//! batching, identifier assignment, and failure behavior of the ingest
//! pipeline.

use chrono::Utc;
use skimmer::config::SinkSettings;
use skimmer::scrape::Document;
use skimmer::sink::{ingest, HttpSink};
use skimmer::SinkError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sink_settings(host: &str) -> SinkSettings {
    SinkSettings {
        host: host.to_string(),
        index: "documents".to_string(),
        doc_type: "page".to_string(),
    }
}

fn document(link: &str) -> Document {
    Document {
        id: String::new(),
        title: "Title".to_string(),
        description: "Description".to_string(),
        content: "Content".to_string(),
        link: link.to_string(),
        tag: "example".to_string(),
        fetched_at: Utc::now(),
    }
}

fn bulk_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(r#"{"took":5,"errors":false,"items":[]}"#)
}

#[tokio::test]
async fn test_single_batch_commit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/page/_bulk"))
        .respond_with(bulk_ok())
        .expect(1)
        .mount(&server)
        .await;

    let sink = HttpSink::new(&sink_settings(&server.uri())).unwrap();
    let documents: Vec<Document> = (0..5)
        .map(|i| document(&format!("http://example.com/{}", i)))
        .collect();

    let report = ingest(&sink, documents).await.unwrap();

    assert_eq!(report.indexed, 5);
    assert_eq!(report.batches, 1);
    assert!(report.docs_per_sec() > 0.0);
}

#[tokio::test]
async fn test_batching_splits_at_one_thousand() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/page/_bulk"))
        .respond_with(bulk_ok())
        .expect(2)
        .mount(&server)
        .await;

    let sink = HttpSink::new(&sink_settings(&server.uri())).unwrap();
    let documents: Vec<Document> = (0..1001)
        .map(|i| document(&format!("http://example.com/{}", i)))
        .collect();

    let report = ingest(&sink, documents).await.unwrap();

    assert_eq!(report.indexed, 1001);
    assert_eq!(report.batches, 2, "1001 documents must commit as 1000 + 1");
}

#[tokio::test]
async fn test_unique_ids_assigned_at_ingestion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/page/_bulk"))
        .respond_with(bulk_ok())
        .mount(&server)
        .await;

    let sink = HttpSink::new(&sink_settings(&server.uri())).unwrap();
    let documents: Vec<Document> = (0..10)
        .map(|i| document(&format!("http://example.com/{}", i)))
        .collect();

    ingest(&sink, documents).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    let mut ids = Vec::new();
    for line in body.lines() {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        if let Some(action) = value.get("index") {
            let id = action.get("_id").and_then(|v| v.as_str()).unwrap();
            assert!(!id.is_empty(), "every document must get an id");
            ids.push(id.to_string());
        }
    }

    assert_eq!(ids.len(), 10);
    let distinct: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(distinct.len(), 10, "ids must be unique");
}

#[tokio::test]
async fn test_existing_id_preserved() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/page/_bulk"))
        .respond_with(bulk_ok())
        .mount(&server)
        .await;

    let sink = HttpSink::new(&sink_settings(&server.uri())).unwrap();
    let mut doc = document("http://example.com/");
    doc.id = "preset-id".to_string();

    ingest(&sink, vec![doc]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("preset-id"));
}

#[tokio::test]
async fn test_bulk_commit_failure_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/page/_bulk"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"took":5,"errors":true,"items":[{"index":{"status":500}}]}"#),
        )
        .mount(&server)
        .await;

    let sink = HttpSink::new(&sink_settings(&server.uri())).unwrap();
    let result = ingest(&sink, vec![document("http://example.com/")]).await;

    assert!(matches!(result, Err(SinkError::BulkCommit(_))));
}

#[tokio::test]
async fn test_http_error_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/documents/page/_bulk"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let sink = HttpSink::new(&sink_settings(&server.uri())).unwrap();
    let result = ingest(&sink, vec![document("http://example.com/")]).await;

    assert!(matches!(result, Err(SinkError::BulkCommit(_))));
}

#[tokio::test]
async fn test_empty_ingestion_rejected_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(bulk_ok())
        .expect(0)
        .mount(&server)
        .await;

    let sink = HttpSink::new(&sink_settings(&server.uri())).unwrap();
    let result = ingest(&sink, Vec::new()).await;

    assert!(matches!(result, Err(SinkError::NonPositiveCount)));
}
