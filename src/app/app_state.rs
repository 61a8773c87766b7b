use std::time::Duration;

use serde_json::Value;

use crate::history::RecentHistory;
use crate::search::SearchController;

/// Line-driven search session
///
/// Each input line is either the full current query or a `:command`.
pub struct App {
    pub search: SearchController<Value>,
    pub recent: RecentHistory,
    /// Upper bound on how long one query may take to settle
    settle_timeout: Duration,
    should_quit: bool,
}

impl App {
    pub fn new(search: SearchController<Value>, recent: RecentHistory, settle_timeout: Duration) -> Self {
        Self {
            search,
            recent,
            settle_timeout,
            should_quit: false,
        }
    }

    pub fn settle_timeout(&self) -> Duration {
        self.settle_timeout
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(super) fn quit(&mut self) {
        self.should_quit = true;
        self.search.unmount();
    }
}
