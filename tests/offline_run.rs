mod common;

use chrono::Duration;
use common::*;
use tempfile::TempDir;
use vibe_adapters::offline::{offline_collaborators, snapshot_file_name};
use vibe_core::PublicationLogEntry;
use vibe_persistence::DataLayout;
use vibeflow::{RunError, RunStores, WeeklyRunManager};

fn write_snapshot(output: &std::path::Path, feed: &str, entries: serde_json::Value) {
    let feeds = output.join("feeds");
    std::fs::create_dir_all(&feeds).unwrap();
    std::fs::write(feeds.join(snapshot_file_name(feed).unwrap()), entries.to_string()).unwrap();
}

fn open_manager(dir: &TempDir) -> WeeklyRunManager {
    let layout = DataLayout::new(dir.path().join("data"));
    WeeklyRunManager::new(write_sources(dir, &[FEED_A]),
                          offline_collaborators(dir.path().join("output")),
                          RunStores::open(&layout).unwrap(),
                          options())
}

#[tokio::test]
async fn offline_week_persists_everything_and_survives_restart() {
    let dir = TempDir::new().unwrap();
    let published = (monday() - Duration::hours(3)).to_rfc3339();
    write_snapshot(&dir.path().join("output"),
                   FEED_A,
                   serde_json::json!([
                       { "title": "Borrow checker deep dive", "link": "https://alpha.example/borrowck", "published_at": published },
                       { "title": "Tokio 2 roadmap", "link": "https://alpha.example/tokio", "published_at": published },
                       { "title": "Serde tips", "link": "https://alpha.example/serde", "published_at": published }
                   ]));

    let summary = open_manager(&dir).run_at(monday()).await.unwrap();
    assert!(summary.is_clean(), "{}", summary.headline());
    assert_eq!(summary.episode_id, 1);

    let layout = DataLayout::new(dir.path().join("data"));
    assert!(layout.latest_news().exists());
    assert!(layout.run_log(1).exists());
    assert!(layout.transcript(1, monday().date_naive()).exists());
    let log = std::fs::read_to_string(layout.publication_log()).unwrap();
    let entries: Vec<PublicationLogEntry> = log.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().all(|e| e.episode_id == 1 && e.is_published()));
    assert!(dir.path().join("output/outbox/podcast/EP001.json").exists());
    assert_eq!(std::fs::read_to_string(layout.past_topics()).unwrap(), "Borrow checker deep dive\n");

    // mismo snapshot la semana siguiente: nada nuevo, nada publicado
    let mut restarted = open_manager(&dir);
    let second = restarted.run_at(monday() + Duration::weeks(1)).await.unwrap();
    assert_eq!(second.episode_id, 2);
    assert_eq!(second.new_items, 0);
    assert!(!second.committed);
    let state = restarted.stores().run_state.snapshot();
    assert_eq!(state.episode_id, 1);
    assert_eq!(state.released, vec![2]);
    assert_eq!(state.last_run_at, Some(monday()));
    assert_eq!(std::fs::read_to_string(layout.past_topics()).unwrap().lines().count(), 1);
}

#[tokio::test]
async fn covered_topics_are_not_headlined_again_after_restart() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("output");
    let first = (monday() - Duration::hours(3)).to_rfc3339();
    write_snapshot(&output,
                   FEED_A,
                   serde_json::json!([{ "title": "Borrow checker deep dive", "link": "https://alpha.example/borrowck", "published_at": first }]));
    assert!(open_manager(&dir).run_at(monday()).await.unwrap().committed);

    let next = monday() + Duration::weeks(1);
    write_snapshot(&output,
                   FEED_A,
                   serde_json::json!([
                       { "title": "Borrow checker deep dive", "link": "https://alpha.example/borrowck-part-2", "published_at": (next - Duration::hours(1)).to_rfc3339() },
                       { "title": "Const generics", "link": "https://alpha.example/const-generics", "published_at": (next - Duration::hours(3)).to_rfc3339() }
                   ]));
    let mut restarted = open_manager(&dir);
    let history = restarted.stores().archive.history(4).unwrap();
    assert_eq!(history.past_topics, vec!["Borrow checker deep dive"]);
    assert_eq!(history.recent_transcripts.len(), 1);

    let summary = restarted.run_at(next).await.unwrap();
    assert!(summary.committed);
    let layout = DataLayout::new(dir.path().join("data"));
    let topics = std::fs::read_to_string(layout.past_topics()).unwrap();
    assert_eq!(topics.lines().collect::<Vec<_>>(), vec!["Borrow checker deep dive", "Const generics"]);
}

#[tokio::test]
async fn crash_with_pending_reservation_needs_manual_release() {
    let dir = TempDir::new().unwrap();
    write_snapshot(&dir.path().join("output"), FEED_A, serde_json::json!([]));
    {
        let mut crashed = open_manager(&dir);
        crashed.stores_mut().run_state.begin_run().unwrap();
    }

    let mut m = open_manager(&dir);
    assert!(matches!(m.run_at(monday()).await, Err(RunError::StateConflict(_))));

    m.stores_mut().run_state.release_run(1).unwrap();
    let summary = m.run_at(monday()).await.unwrap();
    assert_eq!(summary.episode_id, 2);
}
