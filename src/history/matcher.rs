use std::fmt;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::storage::RecentEntry;

pub struct RecentMatcher {
    matcher: SkimMatcherV2,
}

impl fmt::Debug for RecentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecentMatcher").finish_non_exhaustive()
    }
}

impl Default for RecentMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentMatcher {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Indices of entries matching every whitespace-separated term, best first
    ///
    /// Terms are matched against the title and URL together.
    pub fn filter(&self, query: &str, entries: &[RecentEntry]) -> Vec<usize> {
        let terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return (0..entries.len()).collect();
        }

        let mut scored: Vec<(usize, i64)> = entries
            .iter()
            .enumerate()
            .filter_map(|(idx, entry)| {
                let haystack = format!("{} {}", entry.title, entry.url);
                let mut total_score: i64 = 0;
                for term in &terms {
                    total_score += self.matcher.fuzzy_match(&haystack, term)?;
                }
                Some((idx, total_score))
            })
            .collect();

        // Stable sort keeps recency order among equal scores
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        scored.into_iter().map(|(idx, _)| idx).collect()
    }
}
