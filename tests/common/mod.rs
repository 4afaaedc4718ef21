#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;
use vibe_core::testing::FakeStudio;
use vibe_core::{FeedItem, RetryPolicy};
use vibeflow::{RunOptions, RunStores, SourceRegistry, WeeklyRunManager};

pub const FEED_A: &str = "https://alpha.example/rss";
pub const FEED_B: &str = "https://beta.example/feed.xml";

/// Lunes 2025-03-10 09:00 UTC.
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

pub fn item(feed: &str, title: &str, published_at: DateTime<Utc>) -> FeedItem {
    let link = format!("https://news.example/{}", vibe_core::model::slugify(title));
    FeedItem::new(feed, title, link, published_at)
}

/// Items publicados dos horas antes de `at`, en el orden dado.
pub fn fresh(feed: &str, titles: &[&str], at: DateTime<Utc>) -> Vec<FeedItem> {
    titles.iter().map(|t| item(feed, t, at - Duration::hours(2))).collect()
}

pub fn write_sources(dir: &TempDir, feeds: &[&str]) -> SourceRegistry {
    let path = dir.path().join("sources.json");
    std::fs::write(&path, serde_json::json!({ "rss_feeds": feeds }).to_string()).unwrap();
    SourceRegistry::new(path)
}

pub fn options() -> RunOptions {
    RunOptions { retry: RetryPolicy::immediate(3),
                 ..RunOptions::default() }
}

pub fn manager(dir: &TempDir, studio: &Arc<FakeStudio>, stores: RunStores, feeds: &[&str]) -> WeeklyRunManager {
    WeeklyRunManager::new(write_sources(dir, feeds), studio.collaborators(), stores, options())
}
