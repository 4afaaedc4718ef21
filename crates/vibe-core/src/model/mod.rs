//! Modelo de datos del pipeline semanal.

mod artifact;
mod brief;
mod episode;
mod feed;
mod history;
mod publication;
mod social;

pub use artifact::{Artifact, ArtifactEnvelope, AudioArtifact, FeaturedPosts, NewsletterArtifact, ScriptArtifact};
pub use brief::NarrativeBrief;
pub use episode::EpisodeState;
pub use feed::{normalize_link, slugify, FeedItem};
pub use history::{EpisodeHistory, PastTranscript};
pub use publication::{Platform, PublicationLogEntry, PublicationStatus};
pub use social::{split_thread, SocialPlatform, SocialPost};

/// Métricas devueltas por el colaborador de analytics (nombre -> valor).
pub type EpisodeStats = std::collections::BTreeMap<String, f64>;
