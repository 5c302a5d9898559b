//! HTTP fetcher implementation
//!
//! This module handles the individual HTTP requests issued by queue workers:
//! building the shared client, sending HEAD and GET requests, and
//! classifying failures so that the runner's handlers can route them.

use reqwest::Client;
use std::fmt;
use std::time::Duration;
use url::Url;

/// HTTP method of a frontier entry
///
/// Discovered links enter the frontier as HEAD requests so the content type
/// can be checked cheaply; pages worth scraping are then promoted to GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Head,
    Get,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Head => write!(f, "HEAD"),
            Method::Get => write!(f, "GET"),
        }
    }
}

/// Outcome of one fetch, routed to the runner's response handlers
#[derive(Debug)]
pub struct FetchOutcome {
    /// The URL that was fetched
    pub url: Url,

    /// The method that was used
    pub method: Method,

    /// The classified result
    pub result: Result<FetchSuccess, FetchFailure>,
}

/// A response that made it back, whatever its status code
#[derive(Debug)]
pub struct FetchSuccess {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value, empty if absent
    pub content_type: String,

    /// Response body; `None` for HEAD requests
    pub body: Option<String>,
}

impl FetchSuccess {
    /// Returns true if the response declared an HTML content type
    pub fn is_html(&self) -> bool {
        self.content_type.contains("text/html")
    }
}

/// A request that failed before producing a response
#[derive(Debug)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Coarse classification of fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connect,
    Other,
}

/// Builds the HTTP client shared by every worker in a crawl run
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues a single request and classifies the result
///
/// Network and body-read failures are captured in the outcome rather than
/// propagated; a single bad fetch never halts the crawl.
pub async fn perform(client: &Client, method: Method, url: &Url) -> FetchOutcome {
    let request = match method {
        Method::Head => client.head(url.clone()),
        Method::Get => client.get(url.clone()),
    };

    let result = match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            match method {
                Method::Head => Ok(FetchSuccess {
                    status,
                    content_type,
                    body: None,
                }),
                Method::Get => match response.text().await {
                    Ok(body) => Ok(FetchSuccess {
                        status,
                        content_type,
                        body: Some(body),
                    }),
                    Err(e) => Err(classify(e)),
                },
            }
        }
        Err(e) => Err(classify(e)),
    };

    FetchOutcome {
        url: url.clone(),
        method,
        result,
    }
}

fn classify(error: reqwest::Error) -> FetchFailure {
    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connect
    } else {
        FailureKind::Other
    };

    FetchFailure {
        kind,
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("TestSkimmer/1.0").is_ok());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Head.to_string(), "HEAD");
        assert_eq!(Method::Get.to_string(), "GET");
    }

    #[test]
    fn test_is_html() {
        let success = FetchSuccess {
            status: 200,
            content_type: "text/html; charset=utf-8".to_string(),
            body: None,
        };
        assert!(success.is_html());

        let success = FetchSuccess {
            status: 200,
            content_type: "application/pdf".to_string(),
            body: None,
        };
        assert!(!success.is_html());

        let success = FetchSuccess {
            status: 200,
            content_type: String::new(),
            body: None,
        };
        assert!(!success.is_html());
    }
}
