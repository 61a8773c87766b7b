//! Remote search sources
//!
//! A [`SearchSource`] turns a query into a future yielding results. The
//! future is dropped when the request is cancelled, which aborts any
//! transport call it owns.

mod http;

pub use http::HttpSource;

use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur while fetching search results
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Request was superseded or its owner went away
    #[error("Request cancelled")]
    Cancelled,

    /// Connection, DNS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status other than rate limiting
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// HTTP 403/429 from the API
    #[error("Rate limited (HTTP {status})")]
    RateLimited {
        status: u16,
        retry_after: Option<u64>,
    },

    /// Response body was not the expected JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Source could not be constructed from its settings
    #[error("Invalid source configuration: {0}")]
    Config(String),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited { .. })
    }

    /// Text shown to the user in a transient notification
    pub fn user_message(&self) -> String {
        match self {
            FetchError::RateLimited {
                status,
                retry_after: Some(secs),
            } => format!(
                "Rate limited (HTTP {}). Try again in {}s or configure an API token.",
                status, secs
            ),
            FetchError::RateLimited { status, .. } => format!(
                "Rate limited (HTTP {}). Try again later or configure an API token.",
                status
            ),
            other => format!("Search failed: {}", other),
        }
    }
}

/// Something that can answer a search query asynchronously
pub trait SearchSource: Send + 'static {
    /// Result payload; cached as JSON
    type Item: Clone + Serialize + DeserializeOwned + Send + 'static;

    /// Stable name used to namespace cache keys
    fn name(&self) -> &str;

    fn fetch(&self, query: &str) -> BoxFuture<'static, Result<Self::Item, FetchError>>;
}

/// Cache key for `query` against the source called `source_name`
pub fn cache_key(source_name: &str, query: &str) -> String {
    format!("{}:{}", source_name, query.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message_mentions_token() {
        let err = FetchError::RateLimited {
            status: 429,
            retry_after: None,
        };
        let msg = err.user_message();
        assert!(msg.contains("Rate limited"));
        assert!(msg.contains("429"));
        assert!(msg.contains("API token"));
    }

    #[test]
    fn test_rate_limit_message_with_retry_after() {
        let err = FetchError::RateLimited {
            status: 403,
            retry_after: Some(30),
        };
        assert!(err.user_message().contains("Try again in 30s"));
    }

    #[test]
    fn test_generic_error_message() {
        let err = FetchError::Http {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.user_message(), "Search failed: HTTP error (500): boom");
        assert!(!err.is_rate_limited());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cache_key_trims_query() {
        assert_eq!(cache_key("crates", "  serde "), "crates:serde");
    }
}
