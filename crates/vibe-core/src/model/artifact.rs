//! Artifacts tipados producidos por las etapas.
//!
//! `Artifact` es un sum type: el router decide el destino de publicación
//! por variante (ver `router::route`), nunca por inspección dinámica.
//! Cada artifact producido viaja dentro de un `ArtifactEnvelope` que fija
//! episodio, etapa productora, timestamp y hash del cuerpo.
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeedItem, NarrativeBrief, SocialPost};
use crate::hashing::hash_value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptArtifact {
    pub text: String,
    pub show_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub file_path: PathBuf,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterArtifact {
    pub subject: String,
    pub html: String,
    /// `None` mientras es borrador; la etapa de imagen lo completa.
    pub header_image_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedPosts {
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Brief(NarrativeBrief),
    Script(ScriptArtifact),
    Audio(AudioArtifact),
    Newsletter(NewsletterArtifact),
    Social(SocialPost),
    FeaturedPosts(FeaturedPosts),
}

impl Artifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::Brief(_) => "brief",
            Artifact::Script(_) => "script",
            Artifact::Audio(_) => "audio",
            Artifact::Newsletter(_) => "newsletter",
            Artifact::Social(_) => "social",
            Artifact::FeaturedPosts(_) => "featured_posts",
        }
    }

    /// Hash BLAKE3 del JSON canónico del artifact.
    pub fn content_hash(&self) -> Result<String, serde_json::Error> {
        Ok(hash_value(&serde_json::to_value(self)?))
    }
}

/// Artifact producido, atribuido a un episodio y a la etapa que lo generó.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEnvelope {
    pub episode_id: u64,
    pub stage: String,
    pub produced_at: DateTime<Utc>,
    pub hash: String,
    pub body: Artifact,
}

impl ArtifactEnvelope {
    pub fn seal(episode_id: u64, stage: &str, body: Artifact) -> Result<Self, serde_json::Error> {
        let hash = body.content_hash()?;
        Ok(Self { episode_id,
                  stage: stage.to_string(),
                  produced_at: Utc::now(),
                  hash,
                  body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_hash_depends_only_on_body() {
        let body = Artifact::Script(ScriptArtifact { text: "Hola".into(),
                                                     show_notes: "- notas".into() });
        let a = ArtifactEnvelope::seal(3, "script", body.clone()).unwrap();
        let b = ArtifactEnvelope::seal(9, "other", body).unwrap();
        assert_eq!(a.hash, b.hash);
        assert_eq!(a.episode_id, 3);
    }

    #[test]
    fn artifact_serializes_with_kind_tag() {
        let v = serde_json::to_value(Artifact::FeaturedPosts(FeaturedPosts { items: vec![] })).unwrap();
        assert_eq!(v["kind"], "featured_posts");
    }
}
