use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_RECENT_ENTRIES: usize = 100;
const RECENT_DIR: &str = "typeahead";
const RECENT_FILE: &str = "recent.json";

/// A result the user opened, keyed by URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEntry {
    pub url: String,
    pub title: String,
    pub viewed_at: DateTime<Utc>,
}

pub fn recent_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(RECENT_DIR).join(RECENT_FILE))
}

/// Missing or unreadable files load as empty history.
pub fn load_recent(path: &Path) -> Vec<RecentEntry> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("Failed to read recent history {:?}: {}", path, e);
            }
            return Vec::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Ignoring corrupt recent history {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// No file locking - last writer wins if multiple instances run simultaneously.
pub fn save_recent(path: &Path, entries: &[RecentEntry]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let unique_entries = deduplicate(entries);
    let trimmed = trim_to_max(&unique_entries);

    let json = serde_json::to_string_pretty(&trimmed)?;
    fs::write(path, json)
}

/// Removes entries with a repeated URL, keeping the first occurrence of each.
fn deduplicate(entries: &[RecentEntry]) -> Vec<RecentEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(e.url.as_str()))
        .cloned()
        .collect()
}

/// Trims the entries to the maximum allowed size.
fn trim_to_max(entries: &[RecentEntry]) -> Vec<RecentEntry> {
    entries.iter().take(MAX_RECENT_ENTRIES).cloned().collect()
}
