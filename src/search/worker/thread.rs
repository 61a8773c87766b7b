//! Search Worker Thread
//!
//! Runs searches in a background thread to avoid blocking the caller.
//! Receives requests via channel, races each fetch against its cancellation
//! token on a tokio runtime, and sends responses back.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender};

use tokio_util::sync::CancellationToken;

use super::types::{SearchRequest, SearchResponse, WORKER_ERROR_ID, WorkerCache};
use crate::source::{FetchError, SearchSource, cache_key};

/// Spawn the search worker thread
///
/// Creates a background thread with a single-threaded tokio runtime that:
/// 1. Listens for requests on the request channel
/// 2. Serves fresh cache hits without touching the network
/// 3. Fetches misses with cancellation support and caches successes
/// 4. Sends responses back via the response channel
///
/// Requests are handled in order. A superseded request has already been
/// cancelled by the controller, so it yields to the next one at its next
/// await point.
pub fn spawn_worker<S: SearchSource>(
    source: S,
    cache: Option<WorkerCache>,
    request_rx: Receiver<SearchRequest>,
    response_tx: Sender<SearchResponse<S::Item>>,
) {
    std::thread::spawn(move || {
        let panic_tx = response_tx.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create search worker runtime: {}", e);
                    let _ = response_tx.send(SearchResponse::Error {
                        error: FetchError::Config(format!("worker runtime: {}", e)),
                        query: String::new(),
                        request_id: WORKER_ERROR_ID,
                    });
                    return;
                }
            };

            rt.block_on(worker_loop(source, cache, request_rx, response_tx));
        }));

        if let Err(e) = result {
            let panic_msg = if let Some(s) = e.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = e.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            log::error!("Search worker thread panicked: {}", panic_msg);

            // Use request_id = 0 to indicate worker-level error
            let _ = panic_tx.send(SearchResponse::Error {
                error: FetchError::Network(format!("search worker crashed: {}", panic_msg)),
                query: String::new(),
                request_id: WORKER_ERROR_ID,
            });
        }
    });
}

/// Main worker loop - processes requests until the channel closes
///
/// Uses blocking `recv()` on the request channel (fine in dedicated thread).
async fn worker_loop<S: SearchSource>(
    source: S,
    cache: Option<WorkerCache>,
    request_rx: Receiver<SearchRequest>,
    response_tx: Sender<SearchResponse<S::Item>>,
) {
    log::debug!("Search worker started for {}", source.name());

    while let Ok(request) = request_rx.recv() {
        log::debug!(
            "Worker received request {}: {:?}",
            request.request_id,
            request.query
        );
        let response = handle_request(&source, cache.as_ref(), request).await;
        if response_tx.send(response).is_err() {
            // Controller dropped its receiver
            break;
        }
    }

    log::debug!("Search worker shutting down");
}

/// Handle a single search request
pub(crate) async fn handle_request<S: SearchSource>(
    source: &S,
    cache: Option<&WorkerCache>,
    request: SearchRequest,
) -> SearchResponse<S::Item> {
    let SearchRequest {
        query,
        request_id,
        cancel_token,
        ..
    } = request;

    if cancel_token.is_cancelled() {
        return SearchResponse::Cancelled { request_id };
    }

    let key = cache_key(source.name(), &query);

    if let Some(worker_cache) = cache
        && let Some(data) = worker_cache.cache.get::<S::Item>(&key)
    {
        log::debug!("Request {} served from cache", request_id);
        return SearchResponse::Success {
            data,
            query,
            request_id,
            from_cache: true,
        };
    }

    match fetch_with_cancel(source, query.trim(), &cancel_token).await {
        Ok(data) => {
            if let Some(worker_cache) = cache
                && let Err(e) = worker_cache.cache.set(&key, &data, worker_cache.ttl)
            {
                log::warn!("Failed to cache results for {:?}: {}", key, e);
            }
            log::debug!("Request {} succeeded", request_id);
            SearchResponse::Success {
                data,
                query,
                request_id,
                from_cache: false,
            }
        }
        Err(FetchError::Cancelled) => {
            log::debug!("Request {} was cancelled", request_id);
            SearchResponse::Cancelled { request_id }
        }
        Err(error) => {
            log::debug!("Request {} failed: {}", request_id, error);
            SearchResponse::Error {
                error,
                query,
                request_id,
            }
        }
    }
}

/// Race the fetch against the token
///
/// Dropping the fetch future on cancellation aborts the underlying transport call.
async fn fetch_with_cancel<S: SearchSource>(
    source: &S,
    query: &str,
    cancel_token: &CancellationToken,
) -> Result<S::Item, FetchError> {
    let fetch = source.fetch(query);

    tokio::select! {
        biased;

        _ = cancel_token.cancelled() => Err(FetchError::Cancelled),
        result = fetch => result,
    }
}

#[cfg(test)]
#[path = "thread_tests.rs"]
mod thread_tests;
