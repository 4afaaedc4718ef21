//! Contratos de los colaboradores externos.
//!
//! Todos son cajas negras asíncronas: el motor sólo conoce sus entradas,
//! salidas y la clase de error que devuelven. Las implementaciones reales
//! (modelos generativos, APIs de plataformas) y las offline viven fuera del
//! core; `testing::FakeStudio` implementa todos para los tests.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CollaboratorError;
use crate::model::{Artifact, AudioArtifact, EpisodeHistory, EpisodeStats, FeedItem, NarrativeBrief, NewsletterArtifact, ScriptArtifact, SocialPlatform};

#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(&self, feed_url: &str) -> Result<Vec<FeedItem>, CollaboratorError>;
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// `insights` son las métricas del episodio anterior, si las hubo;
    /// `history` lo ya cubierto en episodios confirmados.
    async fn develop_narrative_theme(&self,
                                     items: &[FeedItem],
                                     insights: Option<&EpisodeStats>,
                                     history: &EpisodeHistory)
                                     -> Result<NarrativeBrief, CollaboratorError>;
}

#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate_podcast_script(&self, brief: &NarrativeBrief, episode_id: u64) -> Result<ScriptArtifact, CollaboratorError>;
}

#[async_trait]
pub trait AudioGenerator: Send + Sync {
    async fn generate_audio_from_script(&self, script: &ScriptArtifact, episode_id: u64) -> Result<AudioArtifact, CollaboratorError>;
}

#[async_trait]
pub trait NewsletterGenerator: Send + Sync {
    /// Devuelve el borrador, sin imagen de cabecera.
    async fn generate_newsletter_content(&self, brief: &NarrativeBrief, episode_id: u64) -> Result<NewsletterArtifact, CollaboratorError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn create_newsletter_image(&self, brief: &NarrativeBrief) -> Result<PathBuf, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityVerdict {
    pub passed: bool,
    pub notes: String,
}

impl QualityVerdict {
    pub fn pass() -> Self {
        Self { passed: true,
               notes: String::new() }
    }

    pub fn fail(notes: impl Into<String>) -> Self {
        Self { passed: false,
               notes: notes.into() }
    }
}

/// Revisión de calidad previa a publicar. No falla: un problema del revisor
/// se expresa como veredicto.
#[async_trait]
pub trait QualityReviewer: Send + Sync {
    async fn review(&self, artifact: &Artifact) -> QualityVerdict;
}

#[async_trait]
pub trait PodcastPublisher: Send + Sync {
    /// Devuelve el id del episodio en la plataforma.
    async fn upload(&self, audio_file_path: &Path, episode_id: u64) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait NewsletterPublisher: Send + Sync {
    /// Devuelve el id de campaña.
    async fn schedule(&self, html: &str, image_path: Option<&Path>, episode_id: u64) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait SocialPublisher: Send + Sync {
    /// Devuelve el id del post (el primero, si la plataforma arma un hilo).
    async fn publish(&self, text: &str, platform: SocialPlatform) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait CommunityEngager: Send + Sync {
    /// Devuelve cuántos posts recibieron engagement.
    async fn engage(&self, featured_posts: &[FeedItem]) -> Result<u32, CollaboratorError>;
}

#[async_trait]
pub trait Analytics: Send + Sync {
    async fn get_stats(&self, episode_id: u64) -> Result<EpisodeStats, CollaboratorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

/// Canal de avisos del run (resumen final y alertas críticas).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, level: AlertLevel, message: &str);
}

/// Conjunto completo de colaboradores que necesita un run semanal.
#[derive(Clone)]
pub struct Collaborators {
    pub scraper: Arc<dyn Scraper>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub script_writer: Arc<dyn ScriptGenerator>,
    pub audio: Arc<dyn AudioGenerator>,
    pub newsletter_writer: Arc<dyn NewsletterGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub reviewer: Arc<dyn QualityReviewer>,
    pub podcast: Arc<dyn PodcastPublisher>,
    pub newsletter_publisher: Arc<dyn NewsletterPublisher>,
    pub social: Arc<dyn SocialPublisher>,
    pub community: Arc<dyn CommunityEngager>,
    pub analytics: Arc<dyn Analytics>,
    pub notifier: Arc<dyn Notifier>,
}
