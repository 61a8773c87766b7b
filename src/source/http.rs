//! HTTP JSON search source
//!
//! Issues `GET {endpoint}?{query_param}={query}` and decodes the JSON body,
//! optionally narrowing it with a JSON pointer (e.g. `/crates`).

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde_json::Value;

use super::{FetchError, SearchSource};
use crate::config::HttpConfig;

/// Longest slice of an error body carried into an error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Search source backed by a JSON HTTP API
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    query_param: String,
    results_pointer: Option<String>,
    token: Option<String>,
}

impl HttpSource {
    /// Create a source from the `[http]` config section
    ///
    /// Fails when no endpoint is set or the HTTP client cannot be built.
    pub fn from_config(config: &HttpConfig) -> Result<Self, FetchError> {
        let endpoint = config
            .endpoint
            .as_ref()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| FetchError::Config("missing endpoint".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            query_param: config.query_param.clone(),
            results_pointer: config
                .results_pointer
                .clone()
                .filter(|p| !p.trim().is_empty()),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SearchSource for HttpSource {
    type Item = Value;

    fn name(&self) -> &str {
        &self.endpoint
    }

    fn fetch(&self, query: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
        let mut request = self
            .client
            .get(&self.endpoint)
            .query(&[(self.query_param.as_str(), query)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let pointer = self.results_pointer.clone();

        async move {
            let response = request.send().await.map_err(transport_error)?;
            let status = response.status().as_u16();
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.map_err(transport_error)?;

            check_status(status, retry_after, &body)?;
            parse_body(&body, pointer.as_deref())
        }
        .boxed()
    }
}

fn transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network("request timed out".to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}

/// Map an HTTP status to the error taxonomy
///
/// 403 and 429 are both treated as rate limiting; APIs such as GitHub answer
/// 403 once the anonymous quota is spent.
pub(crate) fn check_status(
    status: u16,
    retry_after: Option<u64>,
    body: &str,
) -> Result<(), FetchError> {
    match status {
        200..=299 => Ok(()),
        403 | 429 => Err(FetchError::RateLimited {
            status,
            retry_after,
        }),
        _ => {
            let trimmed = body.trim();
            let message = if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
            };
            Err(FetchError::Http { status, message })
        }
    }
}

/// Decode the body and apply the optional results pointer
pub(crate) fn parse_body(body: &str, pointer: Option<&str>) -> Result<Value, FetchError> {
    let value: Value = serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    match pointer {
        None => Ok(value),
        Some(p) => value
            .pointer(p)
            .cloned()
            .ok_or_else(|| FetchError::Parse(format!("missing {} in response", p))),
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod http_tests;
