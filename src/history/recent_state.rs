use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::matcher::RecentMatcher;
use super::storage::{self, MAX_RECENT_ENTRIES, RecentEntry};

/// Recently opened results, most recent first
///
/// Every mutation is written through to disk when a path is set. Write
/// failures are logged and otherwise ignored; history is a convenience.
#[derive(Debug)]
pub struct RecentHistory {
    entries: Vec<RecentEntry>,
    path: Option<PathBuf>,
    matcher: RecentMatcher,
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::empty()
    }
}

impl RecentHistory {
    /// In-memory history that never touches disk
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            path: None,
            matcher: RecentMatcher::new(),
        }
    }

    pub fn load(path: &Path) -> Self {
        Self {
            entries: storage::load_recent(path),
            path: Some(path.to_path_buf()),
            matcher: RecentMatcher::new(),
        }
    }

    /// Load from the platform data directory, or stay in memory if there is none
    pub fn load_default() -> Self {
        match storage::recent_path() {
            Some(path) => Self::load(&path),
            None => Self::empty(),
        }
    }

    pub fn record(&mut self, url: &str, title: &str) {
        self.record_at(url, title, Utc::now());
    }

    /// Move `url` to the front, replacing any earlier visit
    pub fn record_at(&mut self, url: &str, title: &str, viewed_at: DateTime<Utc>) {
        let url = url.trim();
        if url.is_empty() {
            return;
        }

        self.entries.retain(|e| e.url != url);
        self.entries.insert(
            0,
            RecentEntry {
                url: url.to_string(),
                title: title.to_string(),
                viewed_at,
            },
        );
        self.entries.truncate(MAX_RECENT_ENTRIES);
        self.persist();
    }

    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.url != url);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    /// Entries fuzzy-matching `query`, best match first
    pub fn filter(&self, query: &str) -> Vec<&RecentEntry> {
        self.matcher
            .filter(query, &self.entries)
            .into_iter()
            .map(|idx| &self.entries[idx])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        if let Some(path) = &self.path
            && let Err(e) = storage::save_recent(path, &self.entries)
        {
            log::warn!("Failed to save recent history to {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
#[path = "recent_state_tests.rs"]
mod recent_state_tests;
