use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SocialPlatform;

/// Destino de publicación de un artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Podcast,
    Newsletter,
    Twitter,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Community,
}

impl From<SocialPlatform> for Platform {
    fn from(p: SocialPlatform) -> Self {
        match p {
            SocialPlatform::Twitter => Platform::Twitter,
            SocialPlatform::LinkedIn => Platform::LinkedIn,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Platform::Podcast => "podcast",
            Platform::Newsletter => "newsletter",
            Platform::Twitter => "twitter",
            Platform::LinkedIn => "linkedin",
            Platform::Community => "community",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PublicationStatus {
    Published,
    Failed(String),
}

/// Entrada append-only del log de publicaciones. Nunca se muta tras
/// escribirse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationLogEntry {
    /// Id devuelto por la plataforma (episodio, campaña, post o conteo).
    pub campaign_id: Option<String>,
    pub episode_id: u64,
    pub stage: String,
    pub platform: Platform,
    pub status: PublicationStatus,
    pub published_at: DateTime<Utc>,
}

impl PublicationLogEntry {
    pub fn is_published(&self) -> bool {
        matches!(self.status, PublicationStatus::Published)
    }
}
