//! typeahead library - Debounced, cancelable remote search with a TTL cache
//!
//! This library exposes the core functionality of typeahead for reuse and testing.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod notification;
pub mod output;
pub mod search;
pub mod source;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use cache::TtlCache;
pub use config::Config;
pub use search::{SearchController, SearchResult, SearchStatus};
pub use source::{FetchError, SearchSource};
