//! Search Worker Types
//!
//! Messages exchanged between a [`SearchController`](crate::search::SearchController)
//! and its background worker.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::cache::TtlCache;
use crate::source::FetchError;

/// Request ID used for failures of the worker itself rather than a request
pub const WORKER_ERROR_ID: u64 = 0;

/// Request to run a search
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// Unique ID for tracking this request (never 0)
    pub request_id: u64,
    pub issued_at: Instant,
    /// Token for cancelling this request
    pub cancel_token: CancellationToken,
}

/// Response from the worker
#[derive(Debug, Clone)]
pub enum SearchResponse<T> {
    Success {
        data: T,
        query: String,
        request_id: u64,
        /// Served from the TTL cache without a network call
        from_cache: bool,
    },
    Error {
        error: FetchError,
        query: String,
        /// `WORKER_ERROR_ID` marks a worker-level failure that applies immediately
        request_id: u64,
    },
    Cancelled {
        request_id: u64,
    },
}

impl<T> SearchResponse<T> {
    pub fn request_id(&self) -> u64 {
        match self {
            SearchResponse::Success { request_id, .. }
            | SearchResponse::Error { request_id, .. }
            | SearchResponse::Cancelled { request_id } => *request_id,
        }
    }
}

/// Cache the worker reads before fetching and fills after a successful fetch
#[derive(Debug, Clone)]
pub struct WorkerCache {
    pub cache: TtlCache,
    pub ttl: Duration,
}

impl WorkerCache {
    pub fn new(cache: TtlCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }
}
