use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::cache::TtlCache;
use crate::config::SearchConfig;
use crate::notification::NotificationState;
use crate::search::debouncer::Debouncer;
use crate::search::worker::{
    SearchRequest, SearchResponse, WORKER_ERROR_ID, WorkerCache, spawn_worker,
};
use crate::source::{SearchSource, cache_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Visible outcome of the latest search
#[derive(Debug, Clone)]
pub struct SearchResult<T> {
    pub status: SearchStatus,
    /// Last successful payload; kept across errors
    pub data: Option<T>,
    /// User-facing message of the last failure
    pub error: Option<String>,
    /// Query that produced `data`
    pub last_query: Option<String>,
    pub from_cache: bool,
}

impl<T> Default for SearchResult<T> {
    fn default() -> Self {
        Self {
            status: SearchStatus::Idle,
            data: None,
            error: None,
            last_query: None,
            from_cache: false,
        }
    }
}

/// Owns the search text and the single in-flight request for one view
///
/// Drive it by calling [`on_query_change`](Self::on_query_change) per
/// keystroke, then [`tick`](Self::tick) and
/// [`poll_response`](Self::poll_response) from the event loop.
pub struct SearchController<T> {
    pub result: SearchResult<T>,
    pub notification: NotificationState,
    query: String,
    debouncer: Debouncer,
    min_query_len: usize,
    source_name: String,
    cache: Option<TtlCache>,

    // Worker channels
    request_tx: Option<Sender<SearchRequest>>,
    response_rx: Option<Receiver<SearchResponse<T>>>,

    // Request tracking
    next_request_id: u64,
    in_flight_request_id: Option<u64>,
    current_cancel_token: Option<CancellationToken>,
    unmounted: bool,
}

impl<T> SearchController<T> {
    /// Create a controller backed by a fresh worker thread for `source`
    pub fn new<S>(source: S, config: &SearchConfig, cache: Option<WorkerCache>) -> Self
    where
        S: SearchSource<Item = T>,
    {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();

        let source_name = source.name().to_string();
        let ttl_cache = cache.as_ref().map(|c| c.cache.clone());

        spawn_worker(source, cache, request_rx, response_tx);

        Self::with_channels(&source_name, config, ttl_cache, request_tx, response_rx)
    }

    /// Create a controller wired to caller-provided channels
    pub fn with_channels(
        source_name: &str,
        config: &SearchConfig,
        cache: Option<TtlCache>,
        request_tx: Sender<SearchRequest>,
        response_rx: Receiver<SearchResponse<T>>,
    ) -> Self {
        Self {
            result: SearchResult::default(),
            notification: NotificationState::new(),
            query: String::new(),
            debouncer: Debouncer::new(config.debounce()),
            min_query_len: config.min_query_len,
            source_name: source_name.to_string(),
            cache,
            request_tx: Some(request_tx),
            response_rx: Some(response_rx),
            next_request_id: 1, // Reserve 0 for worker errors
            in_flight_request_id: None,
            current_cancel_token: None,
            unmounted: false,
        }
    }

    pub fn on_query_change(&mut self, text: &str) {
        self.on_query_change_at(text, Instant::now());
    }

    /// Record a new query
    ///
    /// Queries too short to search reset the view to idle without issuing a
    /// request. Anything else restarts the debounce window.
    pub fn on_query_change_at(&mut self, text: &str, now: Instant) {
        if self.unmounted {
            return;
        }

        self.query = text.to_string();

        if text.trim().chars().count() < self.min_query_len.max(1) {
            self.cancel_in_flight();
            self.debouncer.cancel();
            self.result = SearchResult::default();
            return;
        }

        self.debouncer.schedule_execution_at(now);
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Dispatch the pending query once its debounce window has elapsed
    ///
    /// Returns true if a request was dispatched.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.unmounted || !self.debouncer.should_execute_at(now) {
            return false;
        }

        self.debouncer.mark_executed();
        let query = self.query.clone();
        self.dispatch(&query);
        true
    }

    /// Start a request for `text`, cancelling whatever was in flight
    pub fn dispatch(&mut self, text: &str) {
        if self.unmounted {
            return;
        }

        self.cancel_in_flight();

        let request_id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        if self.next_request_id == WORKER_ERROR_ID {
            self.next_request_id = 1;
        }

        let cancel_token = CancellationToken::new();
        self.current_cancel_token = Some(cancel_token.clone());
        self.in_flight_request_id = Some(request_id);
        self.result.status = SearchStatus::Loading;
        self.result.error = None;

        log::debug!("Sending search request {} for query: {:?}", request_id, text);

        let request = SearchRequest {
            query: text.to_string(),
            request_id,
            issued_at: Instant::now(),
            cancel_token,
        };

        let sent = match &self.request_tx {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        };

        if !sent {
            log::error!("Search worker unavailable for request {}", request_id);
            self.in_flight_request_id = None;
            self.current_cancel_token = None;
            self.request_tx = None;
            self.fail("Search worker unavailable".to_string(), false);
        }
    }

    /// Cancel the in-flight request, if any
    ///
    /// The worker reports the cancellation back, but since the request is no
    /// longer tracked that response is dropped by the staleness check.
    pub fn cancel_in_flight(&mut self) {
        if let Some(token) = self.current_cancel_token.take() {
            token.cancel();
            log::debug!("Cancelled request {:?}", self.in_flight_request_id);
        }
        self.in_flight_request_id = None;

        if self.result.status == SearchStatus::Loading {
            self.result.status = self.settled_status();
        }
    }

    /// Drain all pending worker responses (non-blocking)
    ///
    /// Returns true if any response changed the visible result.
    pub fn poll_response(&mut self) -> bool {
        let rx = match self.response_rx.take() {
            Some(rx) => rx,
            None => return false,
        };

        let mut changed = false;
        loop {
            match rx.try_recv() {
                Ok(response) => {
                    changed |= self.on_settled(response);
                }
                Err(TryRecvError::Empty) => {
                    self.response_rx = Some(rx);
                    break;
                }
                Err(TryRecvError::Disconnected) => {
                    log::error!("Search worker disconnected in poll_response");
                    self.request_tx = None;
                    if self.in_flight_request_id.take().is_some() {
                        self.current_cancel_token = None;
                        self.fail("Search worker disconnected".to_string(), false);
                        changed = true;
                    }
                    break;
                }
            }
        }

        changed
    }

    /// Apply a worker response if it belongs to the latest request
    ///
    /// Returns true if the visible result changed.
    pub fn on_settled(&mut self, response: SearchResponse<T>) -> bool {
        if self.unmounted {
            log::debug!(
                "Ignoring response {} after unmount",
                response.request_id()
            );
            return false;
        }

        let current_request_id = self.in_flight_request_id;

        match response {
            SearchResponse::Success {
                data,
                query,
                request_id,
                from_cache,
            } => {
                if Some(request_id) != current_request_id {
                    log::debug!(
                        "Ignoring stale success from request {} (current: {:?})",
                        request_id,
                        current_request_id
                    );
                    return false;
                }

                self.in_flight_request_id = None;
                self.current_cancel_token = None;
                self.result = SearchResult {
                    status: SearchStatus::Success,
                    data: Some(data),
                    error: None,
                    last_query: Some(query),
                    from_cache,
                };
                true
            }
            SearchResponse::Error {
                error,
                query,
                request_id,
            } => {
                // Worker-level errors (request_id == 0) always apply
                if request_id != WORKER_ERROR_ID && Some(request_id) != current_request_id {
                    log::debug!(
                        "Ignoring stale error from request {} (current: {:?})",
                        request_id,
                        current_request_id
                    );
                    return false;
                }

                if error.is_cancelled() {
                    return self.on_cancelled(request_id, current_request_id);
                }

                log::debug!("Search for {:?} failed: {}", query, error);
                self.in_flight_request_id = None;
                self.current_cancel_token = None;
                let rate_limited = error.is_rate_limited();
                self.fail(error.user_message(), rate_limited);
                true
            }
            SearchResponse::Cancelled { request_id } => {
                self.on_cancelled(request_id, current_request_id)
            }
        }
    }

    // Cancellation is a control signal: settle quietly, never notify
    fn on_cancelled(&mut self, request_id: u64, current_request_id: Option<u64>) -> bool {
        if Some(request_id) != current_request_id {
            return false;
        }
        self.in_flight_request_id = None;
        self.current_cancel_token = None;
        self.result.status = self.settled_status();
        true
    }

    fn fail(&mut self, message: String, rate_limited: bool) {
        if rate_limited {
            self.notification.show_warning(&message);
        } else {
            self.notification.show_error(&message);
        }
        self.result.status = SearchStatus::Error;
        self.result.error = Some(message);
    }

    fn settled_status(&self) -> SearchStatus {
        if self.result.data.is_some() {
            SearchStatus::Success
        } else {
            SearchStatus::Idle
        }
    }

    /// Tear down: cancel outstanding work and ignore anything that arrives later
    ///
    /// Idempotent. Dropping the request channel lets the worker thread exit.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.cancel_in_flight();
        self.debouncer.cancel();
        self.request_tx = None;
        self.response_rx = None;
        self.unmounted = true;
        log::debug!("Search controller for {} unmounted", self.source_name);
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Drop the cached results for `query` so the next search refetches
    pub fn invalidate(&self, query: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(&cache_key(&self.source_name, query));
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> SearchStatus {
        self.result.status
    }

    pub fn is_loading(&self) -> bool {
        self.result.status == SearchStatus::Loading
    }

    /// Check if a request is currently in flight
    pub fn is_pending(&self) -> bool {
        self.in_flight_request_id.is_some()
    }

    /// Check if a keystroke is waiting out its debounce window
    pub fn has_scheduled(&self) -> bool {
        self.debouncer.has_pending()
    }

    pub fn data(&self) -> Option<&T> {
        self.result.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.result.error.as_deref()
    }
}

impl<T> Drop for SearchController<T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[path = "search_state_tests.rs"]
mod search_state_tests;
