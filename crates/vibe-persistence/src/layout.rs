//! Ubicación de cada archivo persistido bajo el directorio de datos.
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_state(&self) -> PathBuf {
        self.root.join("run_state.json")
    }

    pub fn seen_fingerprints(&self) -> PathBuf {
        self.root.join("seen_fingerprints.json")
    }

    pub fn publication_log(&self) -> PathBuf {
        self.root.join("publication_log.jsonl")
    }

    pub fn latest_news(&self) -> PathBuf {
        self.root.join("latest_news.json")
    }

    pub fn run_log(&self, episode_id: u64) -> PathBuf {
        self.root.join("runs").join(format!("EP{episode_id:03}.json"))
    }

    pub fn transcripts_dir(&self) -> PathBuf {
        self.root.join("history").join("transcripts")
    }

    pub fn transcript(&self, episode_id: u64, date: NaiveDate) -> PathBuf {
        self.transcripts_dir()
            .join(format!("{}_EP{episode_id:03}_script.txt", date.format("%Y-%m-%d")))
    }

    /// Titulares de episodios confirmados, uno por línea.
    pub fn past_topics(&self) -> PathBuf {
        self.root.join("history").join("past_topics.txt")
    }
}
