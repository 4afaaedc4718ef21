//! Registro de fuentes: la lista de feeds del run.
//!
//! Formato: `{"rss_feeds": ["https://...", ...]}`. La carga es todo o nada:
//! una sola URL inválida invalida el archivo completo.
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Deserialize;
use url::Url;

use crate::errors::ConfigError;

#[derive(Debug, Deserialize)]
struct SourcesFile {
    rss_feeds: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SourceRegistry {
    path: PathBuf,
}

impl SourceRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Feeds en orden de archivo, sin repetidos.
    pub fn load_sources(&self) -> Result<IndexSet<String>, ConfigError> {
        let raw = std::fs::read(&self.path).map_err(|source| ConfigError::SourcesUnreadable { path: self.path.clone(),
                                                                                              source })?;
        let file: SourcesFile = serde_json::from_slice(&raw).map_err(|e| ConfigError::SourcesMalformed { path: self.path.clone(),
                                                                                                        reason: e.to_string() })?;
        let mut feeds = IndexSet::with_capacity(file.rss_feeds.len());
        for entry in file.rss_feeds {
            feeds.insert(validate_feed_url(entry.trim())?);
        }
        if feeds.is_empty() {
            return Err(ConfigError::NoSources(self.path.clone()));
        }
        Ok(feeds)
    }
}

fn validate_feed_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidFeedUrl { url: raw.to_string(),
                                                                 reason };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(raw.to_string()),
        "http" | "https" => Err(invalid("missing host".into())),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
