use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use tracing::debug;
use vibe_core::repo::{select_new, FingerprintStore};
use vibe_core::{CoreError, FeedItem};

use super::{read_json, write_json_atomic};
use crate::error::PersistenceError;

/// Fingerprints vistos, persistidos como arreglo ordenado en JSON.
#[derive(Debug)]
pub struct FileFingerprintStore {
    path: PathBuf,
    seen: HashSet<String>,
}

impl FileFingerprintStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let stored: Vec<String> = read_json(&path)?.unwrap_or_default();
        Ok(Self { path,
                  seen: stored.into_iter().collect() })
    }

    fn persist(&self, seen: &HashSet<String>) -> Result<(), PersistenceError> {
        let sorted: BTreeSet<&String> = seen.iter().collect();
        write_json_atomic(&self.path, &sorted)
    }
}

impl FingerprintStore for FileFingerprintStore {
    fn filter_new(&mut self, items: Vec<FeedItem>) -> Result<Vec<FeedItem>, CoreError> {
        let total = items.len();
        let fresh = select_new(&self.seen, items);
        if fresh.is_empty() {
            return Ok(fresh);
        }
        let mut next = self.seen.clone();
        next.extend(fresh.iter().map(|i| i.content_hash.clone()));
        self.persist(&next)?;
        self.seen = next;
        debug!(total, fresh = fresh.len(), known = self.seen.len(), "fingerprints recorded");
        Ok(fresh)
    }

    fn contains(&self, content_hash: &str) -> bool {
        self.seen.contains(content_hash)
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}
