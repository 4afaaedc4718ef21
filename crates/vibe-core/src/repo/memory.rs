//! Implementaciones en memoria de los repositorios (tests y runs efímeros).
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};

use super::types::{select_new, topic_line, FingerprintStore, PublicationLog, RunArchive, RunStateRepository};
use crate::errors::CoreError;
use crate::model::{EpisodeHistory, EpisodeState, FeedItem, PastTranscript, PublicationLogEntry, ScriptArtifact};

#[derive(Debug, Default)]
pub struct InMemoryFingerprintStore {
    seen: HashSet<String>,
}

impl InMemoryFingerprintStore {
    pub fn with_seen<I, S>(hashes: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { seen: hashes.into_iter().map(Into::into).collect() }
    }
}

impl FingerprintStore for InMemoryFingerprintStore {
    fn filter_new(&mut self, items: Vec<FeedItem>) -> Result<Vec<FeedItem>, CoreError> {
        let fresh = select_new(&self.seen, items);
        self.seen.extend(fresh.iter().map(|i| i.content_hash.clone()));
        Ok(fresh)
    }

    fn contains(&self, content_hash: &str) -> bool {
        self.seen.contains(content_hash)
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRunStateRepository {
    state: EpisodeState,
}

impl InMemoryRunStateRepository {
    pub fn with_state(state: EpisodeState) -> Self {
        Self { state }
    }
}

impl RunStateRepository for InMemoryRunStateRepository {
    fn snapshot(&self) -> EpisodeState {
        self.state.clone()
    }

    fn begin_run(&mut self) -> Result<u64, CoreError> {
        self.state.reserve()
    }

    fn commit_run_at(&mut self, episode_id: u64, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.state.commit(episode_id, at).map(|_| ())
    }

    fn release_run(&mut self, episode_id: u64) -> Result<(), CoreError> {
        self.state.release(episode_id)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPublicationLog {
    entries: Vec<PublicationLogEntry>,
}

impl PublicationLog for InMemoryPublicationLog {
    fn append(&mut self, entry: &PublicationLogEntry) -> Result<(), CoreError> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<PublicationLogEntry>, CoreError> {
        Ok(self.entries.clone())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRunArchive {
    pub news: Vec<FeedItem>,
    pub transcripts: BTreeMap<u64, (String, String)>,
    pub topics: Vec<String>,
    pub run_logs: BTreeMap<u64, serde_json::Value>,
}

impl RunArchive for InMemoryRunArchive {
    fn cache_news(&mut self, items: &[FeedItem]) -> Result<(), CoreError> {
        self.news = items.to_vec();
        Ok(())
    }

    fn archive_transcript(&mut self, episode_id: u64, date: NaiveDate, script: &ScriptArtifact) -> Result<PathBuf, CoreError> {
        let name = format!("{date}_EP{episode_id:03}_script.txt");
        self.transcripts.insert(episode_id, (name.clone(), script.text.clone()));
        Ok(PathBuf::from(name))
    }

    fn write_run_log(&mut self, episode_id: u64, log: &serde_json::Value) -> Result<(), CoreError> {
        self.run_logs.insert(episode_id, log.clone());
        Ok(())
    }

    fn record_topic(&mut self, _episode_id: u64, topic: &str) -> Result<(), CoreError> {
        let line = topic_line(topic);
        if !line.is_empty() {
            self.topics.push(line);
        }
        Ok(())
    }

    fn history(&self, transcripts: usize) -> Result<EpisodeHistory, CoreError> {
        let skip = self.transcripts.len().saturating_sub(transcripts);
        Ok(EpisodeHistory { past_topics: self.topics.clone(),
                            recent_transcripts: self.transcripts
                                                    .values()
                                                    .skip(skip)
                                                    .map(|(name, text)| PastTranscript { name: name.clone(),
                                                                                         text: text.clone() })
                                                    .collect() })
    }
}
