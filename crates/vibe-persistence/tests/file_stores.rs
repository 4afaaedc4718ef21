use std::fs;

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;
use vibe_core::model::{Platform, PublicationStatus, ScriptArtifact};
use vibe_core::repo::{FingerprintStore, PublicationLog, RunArchive, RunStateRepository};
use vibe_core::{CoreError, EpisodeHistory, FeedItem, PublicationLogEntry};
use vibe_persistence::{DataLayout, FileFingerprintStore, FileRunArchive, FileRunStateRepository, JsonlPublicationLog, PersistenceError};

fn item(title: &str, link: &str) -> FeedItem {
    FeedItem::new("https://news.example/rss", title, link, Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap())
}

#[test]
fn reservation_and_commit_survive_restart() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());

    let mut repo = FileRunStateRepository::open(layout.run_state()).unwrap();
    let first = repo.begin_run().unwrap();
    repo.commit_run(first).unwrap();

    let mut reopened = FileRunStateRepository::open(layout.run_state()).unwrap();
    assert_eq!(reopened.snapshot().episode_id, first);
    assert!(reopened.snapshot().last_run_at.is_some());
    let second = reopened.begin_run().unwrap();
    assert!(second > first);
}

#[test]
fn pending_reservation_after_crash_blocks_next_run_until_released() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    let reserved = {
        let mut repo = FileRunStateRepository::open(layout.run_state()).unwrap();
        repo.begin_run().unwrap()
        // el proceso "muere" sin commit ni release
    };

    let mut repo = FileRunStateRepository::open(layout.run_state()).unwrap();
    assert_eq!(repo.snapshot().pending_reservation(), Some(reserved));
    assert!(matches!(repo.begin_run(), Err(CoreError::StateConflict(_))));

    repo.release_run(reserved).unwrap();
    let next = repo.begin_run().unwrap();
    assert_eq!(next, reserved + 1, "un id liberado no se reutiliza");
    assert_eq!(repo.snapshot().released, vec![reserved]);
}

#[test]
fn second_commit_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = DataLayout::new(dir.path()).run_state();
    let mut repo = FileRunStateRepository::open(&path).unwrap();
    let id = repo.begin_run().unwrap();
    repo.commit_run(id).unwrap();
    let once = fs::read(&path).unwrap();
    repo.commit_run(id).unwrap();
    assert_eq!(fs::read(&path).unwrap(), once);
    assert!(matches!(repo.commit_run(id + 1), Err(CoreError::StateConflict(_))));
}

#[test]
fn corrupt_run_state_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = DataLayout::new(dir.path()).run_state();
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(FileRunStateRepository::open(&path), Err(PersistenceError::Json { .. })));
}

#[test]
fn dedup_holds_across_restarts() {
    let dir = TempDir::new().unwrap();
    let path = DataLayout::new(dir.path()).seen_fingerprints();

    let mut store = FileFingerprintStore::open(&path).unwrap();
    let first = store.filter_new(vec![item("Alpha", "https://x/a"), item("Beta", "https://x/b")]).unwrap();
    assert_eq!(first.len(), 2);

    let mut reopened = FileFingerprintStore::open(&path).unwrap();
    let second = reopened.filter_new(vec![item("ALPHA", "https://x/a/"), item("Gamma", "https://x/c")]).unwrap();
    assert_eq!(second.iter().map(|i| i.title.as_str()).collect::<Vec<_>>(), vec!["Gamma"]);

    let stored: Vec<String> = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.windows(2).all(|w| w[0] < w[1]), "arreglo ordenado");
}

#[test]
fn failed_dedup_write_leaves_persisted_set_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = DataLayout::new(dir.path()).seen_fingerprints();
    let mut store = FileFingerprintStore::open(&path).unwrap();
    store.filter_new(vec![item("Alpha", "https://x/a")]).unwrap();
    let before = fs::read(&path).unwrap();

    // un directorio en el lugar del temporal hace fallar la escritura
    let blocker = path.with_extension("tmp");
    fs::create_dir(&blocker).unwrap();
    let delta = item("Delta", "https://x/d");
    let err = store.filter_new(vec![delta.clone()]).unwrap_err();
    assert!(matches!(err, CoreError::Persistence(_)));
    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!store.contains(&delta.content_hash));
    assert_eq!(store.len(), 1);

    fs::remove_dir(&blocker).unwrap();
    assert_eq!(store.filter_new(vec![delta]).unwrap().len(), 1, "no quedó registrado a medias");
}

#[test]
fn publication_log_appends_in_order() {
    let dir = TempDir::new().unwrap();
    let path = DataLayout::new(dir.path()).publication_log();
    let entry = |stage: &str, platform, status| PublicationLogEntry { campaign_id: None,
                                                                      episode_id: 5,
                                                                      stage: stage.to_string(),
                                                                      platform,
                                                                      status,
                                                                      published_at: Utc::now() };
    let a = entry("audio", Platform::Podcast, PublicationStatus::Published);
    let b = entry("social_twitter", Platform::Twitter, PublicationStatus::Failed("rate limited".into()));

    let mut log = JsonlPublicationLog::new(&path);
    assert!(log.entries().unwrap().is_empty());
    log.append(&a).unwrap();
    log.append(&b).unwrap();

    let reread = JsonlPublicationLog::new(&path).entries().unwrap();
    assert_eq!(reread, vec![a, b]);
    assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
}

#[test]
fn archive_writes_news_cache_transcript_and_run_log() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    let mut archive = FileRunArchive::new(layout.clone());

    archive.cache_news(&[item("Alpha", "https://x/a")]).unwrap();
    let cached: Vec<FeedItem> = serde_json::from_slice(&fs::read(layout.latest_news()).unwrap()).unwrap();
    assert_eq!(cached.len(), 1);

    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let script = ScriptArtifact { text: "Welcome to episode 4".into(),
                                  show_notes: String::new() };
    let path = archive.archive_transcript(4, date, &script).unwrap();
    assert_eq!(path, layout.transcript(4, date));
    assert_eq!(fs::read_to_string(&path).unwrap(), "Welcome to episode 4");

    archive.write_run_log(4, &serde_json::json!({"episode_id": 4})).unwrap();
    assert!(layout.run_log(4).exists());
}

#[test]
fn history_reads_back_topics_and_latest_transcripts() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    let mut archive = FileRunArchive::new(layout.clone());
    assert_eq!(archive.history(4).unwrap(), EpisodeHistory::default());

    for (id, day) in [(1, 3), (2, 10), (3, 17)] {
        let script = ScriptArtifact { text: format!("episode {id}"),
                                      show_notes: String::new() };
        archive.archive_transcript(id, NaiveDate::from_ymd_opt(2025, 3, day).unwrap(), &script).unwrap();
        archive.record_topic(id, &format!("Topic {id}")).unwrap();
    }
    fs::write(layout.transcripts_dir().join("notes.md"), "ignored").unwrap();

    let history = FileRunArchive::new(layout.clone()).history(2).unwrap();
    assert_eq!(history.past_topics, vec!["Topic 1", "Topic 2", "Topic 3"]);
    let names: Vec<&str> = history.recent_transcripts.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["2025-03-10_EP002_script.txt", "2025-03-17_EP003_script.txt"]);
    assert_eq!(history.recent_transcripts[1].text, "episode 3");
}

#[test]
fn recorded_topics_are_single_lines() {
    let dir = TempDir::new().unwrap();
    let layout = DataLayout::new(dir.path());
    let mut archive = FileRunArchive::new(layout.clone());
    archive.record_topic(1, "Async closures\nare   stable").unwrap();
    archive.record_topic(2, "  \n ").unwrap();

    assert_eq!(fs::read_to_string(layout.past_topics()).unwrap(), "Async closures are stable\n");
    assert!(archive.history(0).unwrap().recent_transcripts.is_empty());
}
