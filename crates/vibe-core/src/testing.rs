//! Colaboradores falsos con desenlaces programables y registro de llamadas.
//!
//! `FakeStudio` implementa todos los traits de `collaborators`. Por defecto
//! cada operación tiene éxito con una salida determinista derivada de sus
//! entradas; `fail_times`/`fail_always` programan errores por operación.
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::collaborators::*;
use crate::errors::CollaboratorError;
use crate::model::{slugify, Artifact, AudioArtifact, EpisodeHistory, EpisodeStats, FeedItem, NarrativeBrief, NewsletterArtifact, ScriptArtifact, SocialPlatform};

/// Nombres de operación para programar fallos y contar llamadas.
pub mod ops {
    pub const SCRAPE: &str = "scrape";
    pub const SYNTHESIS: &str = "synthesis";
    pub const SCRIPT: &str = "script";
    pub const AUDIO: &str = "audio";
    pub const NEWSLETTER: &str = "newsletter";
    pub const IMAGE: &str = "image";
    pub const REVIEW: &str = "review";
    pub const UPLOAD: &str = "upload";
    pub const SCHEDULE: &str = "schedule";
    pub const SOCIAL: &str = "social";
    pub const ENGAGE: &str = "engage";
    pub const STATS: &str = "stats";
    pub const NOTIFY: &str = "notify";
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Scrape(String),
    /// Hashes de los items recibidos y titulares previos vistos.
    Synthesis { items: Vec<String>, with_insights: bool, past_topics: Vec<String> },
    Script(u64),
    Audio(u64),
    Newsletter(u64),
    Image(String),
    Review(&'static str),
    Upload(u64),
    Schedule { episode_id: u64, with_image: bool },
    Social { platform: SocialPlatform, text: String },
    /// Hashes de los posts destacados.
    Engage(Vec<String>),
    Stats(u64),
    Notify(AlertLevel, String),
}

impl RecordedCall {
    pub fn op(&self) -> &'static str {
        match self {
            RecordedCall::Scrape(_) => ops::SCRAPE,
            RecordedCall::Synthesis { .. } => ops::SYNTHESIS,
            RecordedCall::Script(_) => ops::SCRIPT,
            RecordedCall::Audio(_) => ops::AUDIO,
            RecordedCall::Newsletter(_) => ops::NEWSLETTER,
            RecordedCall::Image(_) => ops::IMAGE,
            RecordedCall::Review(_) => ops::REVIEW,
            RecordedCall::Upload(_) => ops::UPLOAD,
            RecordedCall::Schedule { .. } => ops::SCHEDULE,
            RecordedCall::Social { .. } => ops::SOCIAL,
            RecordedCall::Engage(_) => ops::ENGAGE,
            RecordedCall::Stats(_) => ops::STATS,
            RecordedCall::Notify(..) => ops::NOTIFY,
        }
    }
}

#[derive(Default)]
struct StudioState {
    feeds: HashMap<String, Vec<FeedItem>>,
    feed_failures: HashMap<String, CollaboratorError>,
    queued: HashMap<&'static str, VecDeque<CollaboratorError>>,
    always: HashMap<&'static str, CollaboratorError>,
    rejected_kinds: HashSet<&'static str>,
    featured: usize,
    stats: EpisodeStats,
    delays: HashMap<&'static str, Duration>,
    calls: Vec<RecordedCall>,
}

pub struct FakeStudio {
    state: Mutex<StudioState>,
}

impl FakeStudio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { state: Mutex::new(StudioState { featured: 1,
                                                        ..Default::default() }) })
    }

    fn lock(&self) -> MutexGuard<'_, StudioState> {
        // Un test que paniqueó con el lock tomado no debe envenenar al resto.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators { scraper: self.clone(),
                        synthesizer: self.clone(),
                        script_writer: self.clone(),
                        audio: self.clone(),
                        newsletter_writer: self.clone(),
                        image: self.clone(),
                        reviewer: self.clone(),
                        podcast: self.clone(),
                        newsletter_publisher: self.clone(),
                        social: self.clone(),
                        community: self.clone(),
                        analytics: self.clone(),
                        notifier: self.clone() }
    }

    pub fn with_feed(&self, url: &str, items: Vec<FeedItem>) -> &Self {
        self.lock().feeds.insert(url.to_string(), items);
        self
    }

    /// El scrape de `url` falla siempre con `error`.
    pub fn fail_feed(&self, url: &str, error: CollaboratorError) -> &Self {
        self.lock().feed_failures.insert(url.to_string(), error);
        self
    }

    /// Las próximas `times` llamadas a `op` fallan con `error`.
    pub fn fail_times(&self, op: &'static str, times: usize, error: CollaboratorError) -> &Self {
        let mut state = self.lock();
        let queue = state.queued.entry(op).or_default();
        queue.extend(std::iter::repeat(error).take(times));
        drop(state);
        self
    }

    pub fn fail_always(&self, op: &'static str, error: CollaboratorError) -> &Self {
        self.lock().always.insert(op, error);
        self
    }

    /// `op` tarda `delay` antes de responder.
    pub fn delay(&self, op: &'static str, delay: Duration) -> &Self {
        self.lock().delays.insert(op, delay);
        self
    }

    /// El revisor rechaza los artifacts de este tipo (`Artifact::kind`).
    pub fn reject_reviews(&self, kind: &'static str) -> &Self {
        self.lock().rejected_kinds.insert(kind);
        self
    }

    /// Cantidad de items (desde el primero) que la síntesis marca destacados.
    pub fn featured(&self, count: usize) -> &Self {
        self.lock().featured = count;
        self
    }

    pub fn with_stats(&self, stats: EpisodeStats) -> &Self {
        self.lock().stats = stats;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    // Registra la llamada y devuelve el fallo programado, si hay.
    async fn enter(&self, call: RecordedCall) -> Result<(), CollaboratorError> {
        let op = call.op();
        let (delay, outcome) = {
            let mut state = self.lock();
            state.calls.push(call);
            let outcome = match state.always.get(op) {
                Some(e) => Err(e.clone()),
                None => state.queued.get_mut(op).and_then(VecDeque::pop_front).map_or(Ok(()), Err),
            };
            (state.delays.get(op).copied(), outcome)
        };
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        outcome
    }
}

#[async_trait]
impl Scraper for FakeStudio {
    async fn scrape(&self, feed_url: &str) -> Result<Vec<FeedItem>, CollaboratorError> {
        self.enter(RecordedCall::Scrape(feed_url.to_string())).await?;
        let state = self.lock();
        if let Some(e) = state.feed_failures.get(feed_url) {
            return Err(e.clone());
        }
        Ok(state.feeds.get(feed_url).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl Synthesizer for FakeStudio {
    async fn develop_narrative_theme(&self,
                                     items: &[FeedItem],
                                     insights: Option<&EpisodeStats>,
                                     history: &EpisodeHistory)
                                     -> Result<NarrativeBrief, CollaboratorError> {
        self.enter(RecordedCall::Synthesis { items: items.iter().map(|i| i.content_hash.clone()).collect(),
                                             with_insights: insights.is_some(),
                                             past_topics: history.past_topics.clone() })
            .await?;
        let featured = self.lock().featured;
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        Ok(NarrativeBrief { headline: format!("This week: {}", titles.first().copied().unwrap_or("quiet news")),
                            theme_summary: titles.join("; "),
                            supporting_items: items.to_vec(),
                            tone_directives: vec!["conversational".into()],
                            featured_posts: items.iter().take(featured).cloned().collect() })
    }
}

#[async_trait]
impl ScriptGenerator for FakeStudio {
    async fn generate_podcast_script(&self, brief: &NarrativeBrief, episode_id: u64) -> Result<ScriptArtifact, CollaboratorError> {
        self.enter(RecordedCall::Script(episode_id)).await?;
        Ok(ScriptArtifact { text: format!("Episode {episode_id}. {}\n{}", brief.headline, brief.theme_summary),
                            show_notes: brief.supporting_items.iter().map(|i| format!("- {}", i.link)).collect::<Vec<_>>().join("\n") })
    }
}

#[async_trait]
impl AudioGenerator for FakeStudio {
    async fn generate_audio_from_script(&self, script: &ScriptArtifact, episode_id: u64) -> Result<AudioArtifact, CollaboratorError> {
        self.enter(RecordedCall::Audio(episode_id)).await?;
        let words = script.text.split_whitespace().count() as u64;
        Ok(AudioArtifact { file_path: PathBuf::from(format!("EP{episode_id:03}.mp3")),
                           duration: Duration::from_millis(words * 400) })
    }
}

#[async_trait]
impl NewsletterGenerator for FakeStudio {
    async fn generate_newsletter_content(&self, brief: &NarrativeBrief, episode_id: u64) -> Result<NewsletterArtifact, CollaboratorError> {
        self.enter(RecordedCall::Newsletter(episode_id)).await?;
        Ok(NewsletterArtifact { subject: brief.headline.clone(),
                                html: format!("<h1>{}</h1><p>{}</p>", brief.headline, brief.theme_summary),
                                header_image_path: None })
    }
}

#[async_trait]
impl ImageGenerator for FakeStudio {
    async fn create_newsletter_image(&self, brief: &NarrativeBrief) -> Result<PathBuf, CollaboratorError> {
        self.enter(RecordedCall::Image(brief.headline.clone())).await?;
        Ok(PathBuf::from(format!("header-{}.png", slugify(&brief.headline))))
    }
}

#[async_trait]
impl QualityReviewer for FakeStudio {
    async fn review(&self, artifact: &Artifact) -> QualityVerdict {
        let kind = artifact.kind();
        if self.enter(RecordedCall::Review(kind)).await.is_err() || self.lock().rejected_kinds.contains(kind) {
            return QualityVerdict::fail(format!("{kind} rejected"));
        }
        QualityVerdict::pass()
    }
}

#[async_trait]
impl PodcastPublisher for FakeStudio {
    async fn upload(&self, _audio_file_path: &Path, episode_id: u64) -> Result<String, CollaboratorError> {
        self.enter(RecordedCall::Upload(episode_id)).await?;
        Ok(format!("podcast-ep-{episode_id}"))
    }
}

#[async_trait]
impl NewsletterPublisher for FakeStudio {
    async fn schedule(&self, _html: &str, image_path: Option<&Path>, episode_id: u64) -> Result<String, CollaboratorError> {
        self.enter(RecordedCall::Schedule { episode_id,
                                            with_image: image_path.is_some() })
            .await?;
        Ok(format!("campaign-{episode_id}"))
    }
}

#[async_trait]
impl SocialPublisher for FakeStudio {
    async fn publish(&self, text: &str, platform: SocialPlatform) -> Result<String, CollaboratorError> {
        self.enter(RecordedCall::Social { platform,
                                          text: text.to_string() })
            .await?;
        Ok(format!("{}-post-{}", platform.as_str(), self.count(ops::SOCIAL)))
    }
}

#[async_trait]
impl CommunityEngager for FakeStudio {
    async fn engage(&self, featured_posts: &[FeedItem]) -> Result<u32, CollaboratorError> {
        self.enter(RecordedCall::Engage(featured_posts.iter().map(|i| i.content_hash.clone()).collect())).await?;
        Ok(featured_posts.len() as u32)
    }
}

#[async_trait]
impl Analytics for FakeStudio {
    async fn get_stats(&self, episode_id: u64) -> Result<EpisodeStats, CollaboratorError> {
        self.enter(RecordedCall::Stats(episode_id)).await?;
        Ok(self.lock().stats.clone())
    }
}

#[async_trait]
impl Notifier for FakeStudio {
    async fn notify(&self, level: AlertLevel, message: &str) {
        let _ = self.enter(RecordedCall::Notify(level, message.to_string())).await;
    }
}
