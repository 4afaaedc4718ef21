use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hashing::sha256_hex;

/// Item scrapeado de un feed. Inmutable; `content_hash` identifica el
/// contenido con independencia de la fuente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub source_url: String,
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub content_hash: String,
}

impl FeedItem {
    pub fn new(source_url: impl Into<String>, title: impl Into<String>, link: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        let title = title.into();
        let link = link.into();
        let content_hash = Self::fingerprint(&title, &link);
        Self { source_url: source_url.into(),
               title,
               link,
               published_at,
               content_hash }
    }

    /// Digest estable de título y link normalizados.
    pub fn fingerprint(title: &str, link: &str) -> String {
        sha256_hex(&format!("{}\n{}", slugify(title), normalize_link(link)))
    }
}

/// Minúsculas; cada corrida de caracteres no alfanuméricos pasa a un `-`.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

pub fn normalize_link(link: &str) -> String {
    link.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation_and_case() {
        assert_eq!(slugify("  MCP 1.0: What's New?! "), "mcp-1-0-what-s-new");
    }

    #[test]
    fn same_title_and_link_share_hash_across_sources() {
        let at = Utc::now();
        let a = FeedItem::new("https://a.example/feed", "Agents, Everywhere", "https://blog.example/agents/", at);
        let b = FeedItem::new("https://b.example/rss", "agents everywhere", " https://blog.example/agents", at);
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn different_link_changes_hash() {
        let at = Utc::now();
        let a = FeedItem::new("s", "Same title", "https://x.example/1", at);
        let b = FeedItem::new("s", "Same title", "https://x.example/2", at);
        assert_ne!(a.content_hash, b.content_hash);
    }
}
