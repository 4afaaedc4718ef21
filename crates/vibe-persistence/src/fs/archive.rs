use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, info};
use vibe_core::model::{PastTranscript, ScriptArtifact};
use vibe_core::repo::{topic_line, RunArchive};
use vibe_core::{CoreError, EpisodeHistory, FeedItem};

use super::{append_line, read_text, write_atomic, write_json_atomic};
use crate::error::PersistenceError;
use crate::layout::DataLayout;

const TRANSCRIPT_SUFFIX: &str = "_script.txt";

/// Salidas secundarias de cada run bajo el directorio de datos.
#[derive(Debug, Clone)]
pub struct FileRunArchive {
    layout: DataLayout,
}

impl FileRunArchive {
    pub fn new(layout: DataLayout) -> Self {
        Self { layout }
    }

    // Los nombres empiezan con la fecha: el orden lexicográfico es el
    // cronológico.
    fn transcript_names(&self) -> Result<Vec<String>, PersistenceError> {
        let dir = self.layout.transcripts_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&dir, e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PersistenceError::io(&dir, e))?;
            if let Some(name) = entry.file_name().to_str().filter(|n| n.ends_with(TRANSCRIPT_SUFFIX)) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

impl RunArchive for FileRunArchive {
    fn cache_news(&mut self, items: &[FeedItem]) -> Result<(), CoreError> {
        write_json_atomic(&self.layout.latest_news(), items)?;
        Ok(())
    }

    fn archive_transcript(&mut self, episode_id: u64, date: NaiveDate, script: &ScriptArtifact) -> Result<PathBuf, CoreError> {
        let path = self.layout.transcript(episode_id, date);
        write_atomic(&path, script.text.as_bytes())?;
        info!(episode_id, path = %path.display(), "transcript archived");
        Ok(path)
    }

    fn write_run_log(&mut self, episode_id: u64, log: &serde_json::Value) -> Result<(), CoreError> {
        write_json_atomic(&self.layout.run_log(episode_id), log)?;
        Ok(())
    }

    fn record_topic(&mut self, episode_id: u64, topic: &str) -> Result<(), CoreError> {
        let line = topic_line(topic);
        if line.is_empty() {
            return Ok(());
        }
        append_line(&self.layout.past_topics(), &line)?;
        info!(episode_id, topic = %line, "topic recorded");
        Ok(())
    }

    fn history(&self, transcripts: usize) -> Result<EpisodeHistory, CoreError> {
        let past_topics: Vec<String> = read_text(&self.layout.past_topics())?.map(|raw| {
                                                                    raw.lines()
                                                                       .map(str::trim)
                                                                       .filter(|l| !l.is_empty())
                                                                       .map(String::from)
                                                                       .collect()
                                                                })
                                                                .unwrap_or_default();
        let names = self.transcript_names()?;
        let mut recent_transcripts = Vec::new();
        for name in names.iter().skip(names.len().saturating_sub(transcripts)) {
            let path = self.layout.transcripts_dir().join(name);
            let text = fs::read_to_string(&path).map_err(|e| PersistenceError::io(&path, e))?;
            recent_transcripts.push(PastTranscript { name: name.clone(),
                                                     text });
        }
        debug!(topics = past_topics.len(), transcripts = recent_transcripts.len(), "history loaded");
        Ok(EpisodeHistory { past_topics,
                            recent_transcripts })
    }
}
