//! Search module
//!
//! Turns a stream of keystrokes into at most one active remote request,
//! discarding results from superseded requests.

pub mod debouncer;
mod search_state;
pub mod worker;

pub use debouncer::Debouncer;
pub use search_state::{SearchController, SearchResult, SearchStatus};
