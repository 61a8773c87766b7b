use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use super::app_state::App;
use crate::output::{format_results, result_items};
use crate::search::SearchStatus;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything that is not a known command is the current query
    Query(String),
    /// `:open N` (1-based)
    Open(usize),
    /// `:recent [filter]`
    Recent(String),
    /// `:invalidate`
    Invalidate,
    /// `:quit` or `:q`
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix(':') else {
            return Command::Query(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "q" | "quit" => Command::Quit,
            "invalidate" => Command::Invalidate,
            "recent" => Command::Recent(arg.to_string()),
            "open" => match arg.parse::<usize>() {
                Ok(n) if n > 0 => Command::Open(n),
                _ => Command::Query(line.to_string()),
            },
            _ => Command::Query(line.to_string()),
        }
    }
}

impl App {
    /// Handle one input line, writing results to `out` and notifications to `err`
    pub fn handle_line(
        &mut self,
        line: &str,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<()> {
        match Command::parse(line) {
            Command::Query(text) => self.run_query(&text, out)?,
            Command::Open(n) => self.open_result(n, out)?,
            Command::Recent(filter) => self.list_recent(&filter, out)?,
            Command::Invalidate => {
                let query = self.search.query().to_string();
                if query.trim().is_empty() {
                    self.search.notification.show_warning("Nothing to invalidate");
                } else {
                    self.search.invalidate(&query);
                    self.search
                        .notification
                        .show(&format!("Cache cleared for '{}'", query.trim()));
                }
            }
            Command::Quit => self.quit(),
        }

        self.flush_notification(err)
    }

    fn run_query(&mut self, text: &str, out: &mut impl Write) -> io::Result<()> {
        self.search.on_query_change(text);

        if !self.wait_for_settle() {
            log::warn!("Query {:?} did not settle in {:?}", text, self.settle_timeout());
            self.search
                .notification
                .show_warning("Still waiting for results; try again");
            return Ok(());
        }

        match self.search.status() {
            SearchStatus::Success => {
                if let Some(data) = self.search.data() {
                    writeln!(out, "{}", format_results(data))?;
                }
                if self.search.result.from_cache {
                    writeln!(out, "(cached)")?;
                }
            }
            // Idle results are empty; errors surface as notifications
            SearchStatus::Idle | SearchStatus::Error | SearchStatus::Loading => {}
        }
        Ok(())
    }

    /// Drive the debouncer and drain responses until the query settles
    ///
    /// Returns false if the timeout passed first.
    pub fn wait_for_settle(&mut self) -> bool {
        let start = Instant::now();
        let deadline = self.settle_timeout();

        loop {
            self.search.tick();
            self.search.poll_response();

            if !self.search.has_scheduled() && !self.search.is_pending() {
                return true;
            }
            if start.elapsed() >= deadline {
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn open_result(&mut self, n: usize, out: &mut impl Write) -> io::Result<()> {
        let item = self
            .search
            .data()
            .and_then(|data| result_items(data).into_iter().nth(n - 1));

        match item {
            Some(item) => match item.url {
                Some(url) => {
                    self.recent.record(&url, &item.label);
                    writeln!(out, "{}", url)?;
                }
                None => self
                    .search
                    .notification
                    .show_warning(&format!("Result {} has no URL", n)),
            },
            None => self
                .search
                .notification
                .show_warning(&format!("No result {}", n)),
        }
        Ok(())
    }

    fn list_recent(&self, filter: &str, out: &mut impl Write) -> io::Result<()> {
        let entries = self.recent.filter(filter);
        if entries.is_empty() {
            writeln!(out, "No recent results")?;
            return Ok(());
        }

        for entry in entries {
            writeln!(
                out,
                "{}  {}  <{}>",
                entry.viewed_at.format("%Y-%m-%d %H:%M"),
                entry.title,
                entry.url
            )?;
        }
        Ok(())
    }

    pub fn flush_notification(&mut self, err: &mut impl Write) -> io::Result<()> {
        if let Some(notification) = self.search.notification.take() {
            writeln!(
                err,
                "[{}] {}",
                notification.notification_type.label(),
                notification.message
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "app_events_tests.rs"]
mod app_events_tests;
