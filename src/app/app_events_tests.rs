//! Tests for app_events

use super::*;
use crate::cache::{MemoryStore, TtlCache};
use crate::history::RecentHistory;
use crate::search::SearchController;
use crate::search::worker::WorkerCache;
use crate::source::FetchError;
use crate::test_utils::test_helpers::{ScriptedSource, instant_config};
use serde_json::json;

fn test_app(source: ScriptedSource, cache: Option<WorkerCache>) -> App {
    let search = SearchController::new(source, &instant_config(), cache);
    App::new(search, RecentHistory::empty(), Duration::from_secs(2))
}

/// Run one line and return (stdout, stderr)
fn run(app: &mut App, line: &str) -> (String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    app.handle_line(line, &mut out, &mut err).unwrap();
    (
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

fn crates_source() -> ScriptedSource {
    ScriptedSource::new().respond(
        "serde",
        0,
        Ok(json!([
            { "name": "serde", "url": "https://crates.io/crates/serde" },
            { "name": "serde_json" }
        ])),
    )
}

#[test]
fn test_parse_commands() {
    assert_eq!(Command::parse(":quit"), Command::Quit);
    assert_eq!(Command::parse(" :q "), Command::Quit);
    assert_eq!(Command::parse(":invalidate"), Command::Invalidate);
    assert_eq!(Command::parse(":open 2"), Command::Open(2));
    assert_eq!(Command::parse(":recent"), Command::Recent(String::new()));
    assert_eq!(
        Command::parse(":recent  serde docs "),
        Command::Recent("serde docs".to_string())
    );
}

#[test]
fn test_parse_falls_back_to_query() {
    assert_eq!(Command::parse("serde"), Command::Query("serde".to_string()));
    assert_eq!(Command::parse(":open 0"), Command::Query(":open 0".to_string()));
    assert_eq!(Command::parse(":open x"), Command::Query(":open x".to_string()));
    assert_eq!(Command::parse(":unknown"), Command::Query(":unknown".to_string()));
    assert_eq!(Command::parse(""), Command::Query(String::new()));
}

#[test]
fn test_query_prints_numbered_results() {
    let mut app = test_app(crates_source(), None);

    let (out, err) = run(&mut app, "serde");

    assert!(out.contains("1. serde  <https://crates.io/crates/serde>"));
    assert!(out.contains("2. serde_json"));
    assert!(err.is_empty());
}

#[test]
fn test_cached_query_is_marked() {
    let cache = WorkerCache::new(TtlCache::new(MemoryStore::new()), Duration::from_secs(60));
    let mut app = test_app(crates_source(), Some(cache));

    let (first, _) = run(&mut app, "serde");
    let (second, _) = run(&mut app, "serde");

    assert!(!first.contains("(cached)"));
    assert!(second.contains("(cached)"));
}

#[test]
fn test_invalidate_drops_cached_entry() {
    let cache = WorkerCache::new(TtlCache::new(MemoryStore::new()), Duration::from_secs(60));
    let mut app = test_app(crates_source(), Some(cache));

    run(&mut app, "serde");
    let (_, err) = run(&mut app, ":invalidate");
    let (out, _) = run(&mut app, "serde");

    assert!(err.contains("[info] Cache cleared for 'serde'"));
    assert!(!out.contains("(cached)"));
}

#[test]
fn test_invalidate_without_query_warns() {
    let mut app = test_app(ScriptedSource::new(), None);
    let (_, err) = run(&mut app, ":invalidate");
    assert!(err.contains("[warning] Nothing to invalidate"));
}

#[test]
fn test_rate_limit_prints_warning_and_keeps_results() {
    let source = crates_source().respond(
        "limited",
        0,
        Err(FetchError::RateLimited {
            status: 429,
            retry_after: None,
        }),
    );
    let mut app = test_app(source, None);

    run(&mut app, "serde");
    let (out, err) = run(&mut app, "limited");

    assert!(out.is_empty());
    assert!(err.contains("[warning] Rate limited (HTTP 429)"));
    assert!(app.search.data().is_some());
}

#[test]
fn test_empty_line_prints_nothing() {
    let mut app = test_app(ScriptedSource::new(), None);
    let (out, err) = run(&mut app, "");
    assert!(out.is_empty());
    assert!(err.is_empty());
}

#[test]
fn test_open_records_recent_entry() {
    let mut app = test_app(crates_source(), None);

    run(&mut app, "serde");
    let (out, _) = run(&mut app, ":open 1");

    assert_eq!(out.trim(), "https://crates.io/crates/serde");
    assert_eq!(app.recent.len(), 1);
    assert_eq!(app.recent.entries()[0].title, "serde");

    let (listing, _) = run(&mut app, ":recent ser");
    assert!(listing.contains("serde  <https://crates.io/crates/serde>"));
}

#[test]
fn test_open_without_url_or_out_of_range_warns() {
    let mut app = test_app(crates_source(), None);
    run(&mut app, "serde");

    let (_, no_url) = run(&mut app, ":open 2");
    let (_, missing) = run(&mut app, ":open 9");

    assert!(no_url.contains("Result 2 has no URL"));
    assert!(missing.contains("No result 9"));
    assert!(app.recent.is_empty());
}

#[test]
fn test_recent_empty_listing() {
    let mut app = test_app(ScriptedSource::new(), None);
    let (out, _) = run(&mut app, ":recent");
    assert_eq!(out.trim(), "No recent results");
}

#[test]
fn test_quit_unmounts_search() {
    let mut app = test_app(ScriptedSource::new(), None);
    run(&mut app, ":quit");

    assert!(app.should_quit());
    assert!(app.search.is_unmounted());
}

#[test]
fn test_slow_query_times_out_with_warning() {
    let source = ScriptedSource::new().respond("slow", 5_000, Ok(json!([])));
    let search = SearchController::new(source, &instant_config(), None);
    let mut app = App::new(search, RecentHistory::empty(), Duration::from_millis(100));

    let (out, err) = run(&mut app, "slow");

    assert!(out.is_empty());
    assert!(err.contains("Still waiting for results"));
}
