//! Search Worker Module
//!
//! Runs remote searches in a background thread so the owner of a
//! [`SearchController`](crate::search::SearchController) never blocks.
//!
//! ## Architecture
//!
//! - Single background thread with std::sync::mpsc channels
//! - Blocking recv() in the dedicated thread, tokio runtime for the fetch
//! - Request/Response pattern with cancellation tokens and request IDs
//! - Panics are caught and reported as a worker-level error (request ID 0)
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::mpsc::channel;
//! use typeahead::search::worker::{spawn_worker, SearchRequest, SearchResponse};
//! use tokio_util::sync::CancellationToken;
//!
//! let (request_tx, request_rx) = channel();
//! let (response_tx, response_rx) = channel();
//! spawn_worker(source, None, request_rx, response_tx);
//!
//! request_tx.send(SearchRequest {
//!     query: "serde".to_string(),
//!     request_id: 1,
//!     issued_at: std::time::Instant::now(),
//!     cancel_token: CancellationToken::new(),
//! }).unwrap();
//!
//! match response_rx.recv().unwrap() {
//!     SearchResponse::Success { data, .. } => println!("{:?}", data),
//!     SearchResponse::Error { error, .. } => eprintln!("{}", error),
//!     SearchResponse::Cancelled { .. } => {}
//! }
//! ```

pub mod thread;
pub mod types;

pub use thread::spawn_worker;
pub use types::{SearchRequest, SearchResponse, WORKER_ERROR_ID, WorkerCache};
