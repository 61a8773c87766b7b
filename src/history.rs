//! Recently opened search results
//!
//! A small JSON file under the platform data directory remembers which
//! results were opened, so they can be found again without searching.

mod matcher;
mod recent_state;
pub mod storage;

pub use recent_state::RecentHistory;
pub use storage::{MAX_RECENT_ENTRIES, RecentEntry};
