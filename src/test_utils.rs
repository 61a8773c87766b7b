//! Shared test utilities for typeahead
//!
//! This module provides common test fixtures and helper functions
//! used across multiple test modules.

#[cfg(test)]
pub mod test_helpers {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use futures::future::BoxFuture;
    use serde_json::{Value, json};

    use crate::config::SearchConfig;
    use crate::search::SearchController;
    use crate::source::{FetchError, SearchSource};

    type Script = HashMap<String, (Duration, Result<Value, FetchError>)>;

    /// Source that answers each query with a canned result after a fixed delay
    ///
    /// Unknown queries answer immediately with `{"query": <q>}`.
    #[derive(Clone, Default)]
    pub struct ScriptedSource {
        script: Arc<Script>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, query: &str, delay_ms: u64, result: Result<Value, FetchError>) -> Self {
            Arc::make_mut(&mut self.script).insert(
                query.to_string(),
                (Duration::from_millis(delay_ms), result),
            );
            self
        }

        /// Shared counter of fetches that actually started
        pub fn calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    impl SearchSource for ScriptedSource {
        type Item = Value;

        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch(&self, query: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, result) = self
                .script
                .get(query)
                .cloned()
                .unwrap_or_else(|| (Duration::ZERO, Ok(json!({ "query": query }))));

            Box::pin(async move {
                tokio::time::sleep(delay).await;
                result
            })
        }
    }

    /// Config with no debounce so tests can dispatch through `tick`
    pub fn instant_config() -> SearchConfig {
        SearchConfig {
            debounce_ms: 0,
            min_query_len: 1,
        }
    }

    /// Poll until no request is in flight or the timeout passes
    pub fn wait_for_settle<T>(controller: &mut SearchController<T>, timeout_secs: u64) -> bool {
        let start = Instant::now();
        while controller.is_pending() && start.elapsed() < Duration::from_secs(timeout_secs) {
            controller.poll_response();
            std::thread::sleep(Duration::from_millis(10));
        }
        controller.poll_response();
        !controller.is_pending()
    }

    pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
        counter.load(Ordering::SeqCst)
    }
}
