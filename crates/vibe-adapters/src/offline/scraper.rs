use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use vibe_core::collaborators::Scraper;
use vibe_core::model::slugify;
use vibe_core::{CollaboratorError, FeedItem};

/// Entrada de un snapshot de feed en disco.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSnapshotEntry {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
}

/// Nombre del snapshot de un feed: host y ruta en forma slug.
pub fn snapshot_file_name(feed_url: &str) -> Result<String, CollaboratorError> {
    let url = Url::parse(feed_url).map_err(|e| CollaboratorError::Malformed(format!("{feed_url}: {e}")))?;
    let host = url.host_str().unwrap_or_default();
    Ok(format!("{}.json", slugify(&format!("{host}{}", url.path()))))
}

/// "Scrapea" leyendo `{dir}/<host-y-ruta>.json`.
pub struct SnapshotScraper {
    dir: PathBuf,
}

impl SnapshotScraper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Scraper for SnapshotScraper {
    async fn scrape(&self, feed_url: &str) -> Result<Vec<FeedItem>, CollaboratorError> {
        let path = self.dir.join(snapshot_file_name(feed_url)?);
        let raw = tokio::fs::read(&path).await
                                        .map_err(|e| CollaboratorError::Io(format!("{}: {e}", path.display())))?;
        let entries: Vec<FeedSnapshotEntry> =
            serde_json::from_slice(&raw).map_err(|e| CollaboratorError::Malformed(format!("{}: {e}", path.display())))?;
        debug!(feed_url, items = entries.len(), "snapshot read");
        Ok(entries.into_iter()
                  .map(|e| FeedItem::new(feed_url, e.title, e.link, e.published_at))
                  .collect())
    }
}
