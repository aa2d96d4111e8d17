//! HTTP client for a TruCite scoring backend.
//!
//! Deployments have mounted the scorer on several different paths over time,
//! so the client walks [`CANDIDATE_PATHS`] in order until one answers with a
//! JSON body. 404/405 answers, connection failures, and HTML bodies (a
//! catch-all route serving the landing page) advance the walk; any other
//! HTTP error stops it, since the backend exists but is refusing us.

pub mod normalize;

pub use normalize::{ClaimSummary, VerifyReport};

use std::time::Duration;

use anyhow::{bail, Context};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::protocol::{VerifyRequest, CANDIDATE_PATHS};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 12_000;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Every candidate path failed at the connection level.
    #[error("backend at {base} is unreachable ({detail})")]
    Unreachable { base: String, detail: String },

    /// Every candidate path was tried and none served the scoring API.
    #[error("candidate endpoints exhausted at {base}; no path served the scoring API")]
    Exhausted { base: String },

    /// A path answered 2xx but the body could not be parsed as JSON.
    #[error("{url} answered with a non-JSON body")]
    NotJson { url: String },

    /// A path answered with an HTTP error other than 404/405.
    #[error("{url} answered HTTP {status}")]
    BadStatus { url: String, status: u16 },

    /// The JSON response violates the scoring response contract.
    #[error("{url} violated the response contract: {detail}")]
    Contract { url: String, detail: String },
}

/// A successful verification: the normalized report, the raw body it was
/// folded from, and the endpoint that served it.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub report: VerifyReport,
    pub raw: Value,
    pub endpoint: String,
}

pub struct ScoreClient {
    base: Url,
    http: reqwest::Client,
}

impl ScoreClient {
    pub fn new(base: &str, timeout_ms: u64) -> anyhow::Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid endpoint URL: {base}"))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            bail!("endpoint must be an http(s) URL, got {base}");
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(concat!("trucite/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Ok(Self { base, http })
    }

    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    /// POST the request to each candidate path in order and fold the first
    /// usable answer. Candidate paths are root-relative: the walk always
    /// probes the origin, whatever path the base URL carries.
    pub async fn verify(&self, request: &VerifyRequest) -> Result<VerifyOutcome, ClientError> {
        let mut connect_failures = 0usize;
        let mut last_connect_error = String::new();

        for path in CANDIDATE_PATHS {
            let url = match self.base.join(path) {
                Ok(url) => url,
                Err(_) => continue,
            };

            let response = match self.http.post(url.clone()).json(request).send().await {
                Ok(response) => response,
                Err(err) => {
                    connect_failures += 1;
                    last_connect_error = root_cause(&err);
                    tracing::debug!("candidate {url} failed: {last_connect_error}");
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND
                || status == reqwest::StatusCode::METHOD_NOT_ALLOWED
            {
                tracing::debug!("candidate {url} answered {status}, trying next");
                continue;
            }
            if !status.is_success() {
                return Err(ClientError::BadStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    connect_failures += 1;
                    last_connect_error = root_cause(&err);
                    continue;
                }
            };

            if looks_like_html(&content_type, &body) {
                tracing::debug!("candidate {url} served HTML, trying next");
                continue;
            }

            let raw: Value = serde_json::from_str(&body).map_err(|_| ClientError::NotJson {
                url: url.to_string(),
            })?;

            let report = normalize::normalize(&raw, url.as_str())?;
            return Ok(VerifyOutcome {
                report,
                raw,
                endpoint: url.to_string(),
            });
        }

        if connect_failures == CANDIDATE_PATHS.len() {
            Err(ClientError::Unreachable {
                base: self.base.to_string(),
                detail: last_connect_error,
            })
        } else {
            Err(ClientError::Exhausted {
                base: self.base.to_string(),
            })
        }
    }
}

/// Endpoint from `TRUCITE_ENDPOINT`, falling back to the local runtime port.
pub fn default_endpoint() -> String {
    std::env::var("TRUCITE_ENDPOINT")
        .unwrap_or_else(|_| format!("http://127.0.0.1:{}", crate::server::DEFAULT_PORT))
}

/// Walk a reqwest error chain down to its root cause; the top-level error
/// is usually just "error sending request".
fn root_cause(err: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = err;
    while let Some(inner) = source.source() {
        source = inner;
    }
    source.to_string()
}

/// HTML sniff: the content type header, or a document prefix in the body.
fn looks_like_html(content_type: &str, body: &str) -> bool {
    if content_type.to_ascii_lowercase().contains("text/html") {
        return true;
    }
    let prefix: String = body
        .trim_start()
        .chars()
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();
    prefix.starts_with("<!doctype") || prefix.starts_with("<html")
}
