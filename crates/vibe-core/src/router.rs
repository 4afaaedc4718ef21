//! Router de publicación.
//!
//! El destino se decide por variante de `Artifact` con una tabla estática
//! (`route`). El router no reintenta ni aplica lógica de plataforma: llama al
//! colaborador, anota el desenlace en el log y lo devuelve. Los posts
//! destacados van siempre al engagement de comunidad, nunca al publicador
//! social.
use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::collaborators::{Collaborators, CommunityEngager, NewsletterPublisher, PodcastPublisher, SocialPublisher};
use crate::errors::{CollaboratorError, CoreError};
use crate::model::{Artifact, ArtifactEnvelope, AudioArtifact, FeedItem, NewsletterArtifact, Platform, PublicationLogEntry, PublicationStatus, SocialPost};
use crate::policy::within_deadline;
use crate::repo::PublicationLog;

enum Dispatch<'a> {
    Podcast(&'a AudioArtifact),
    Newsletter(&'a NewsletterArtifact),
    Social(&'a SocialPost),
    Community(&'a [FeedItem]),
}

impl Dispatch<'_> {
    fn platform(&self) -> Platform {
        match self {
            Dispatch::Podcast(_) => Platform::Podcast,
            Dispatch::Newsletter(_) => Platform::Newsletter,
            Dispatch::Social(post) => post.platform.into(),
            Dispatch::Community(_) => Platform::Community,
        }
    }
}

fn dispatch_for(artifact: &Artifact) -> Option<Dispatch<'_>> {
    match artifact {
        Artifact::Audio(audio) => Some(Dispatch::Podcast(audio)),
        Artifact::Newsletter(n) if n.header_image_path.is_some() => Some(Dispatch::Newsletter(n)),
        Artifact::Social(post) => Some(Dispatch::Social(post)),
        Artifact::FeaturedPosts(f) if !f.items.is_empty() => Some(Dispatch::Community(&f.items)),
        Artifact::Newsletter(_) | Artifact::FeaturedPosts(_) | Artifact::Script(_) | Artifact::Brief(_) => None,
    }
}

/// Plataforma destino de un artifact; `None` si no se publica.
pub fn route(artifact: &Artifact) -> Option<Platform> {
    dispatch_for(artifact).map(|d| d.platform())
}

pub struct PublicationRouter {
    podcast: Arc<dyn PodcastPublisher>,
    newsletter: Arc<dyn NewsletterPublisher>,
    social: Arc<dyn SocialPublisher>,
    community: Arc<dyn CommunityEngager>,
    deadline: Option<Instant>,
}

impl PublicationRouter {
    pub fn new(collaborators: &Collaborators) -> Self {
        Self { podcast: collaborators.podcast.clone(),
               newsletter: collaborators.newsletter_publisher.clone(),
               social: collaborators.social.clone(),
               community: collaborators.community.clone(),
               deadline: None }
    }

    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Publica un artifact del episodio `episode_id` y registra el
    /// desenlace en `log` antes de devolverlo. Devuelve `Ok(None)` para
    /// variantes que no se publican. Un envelope de otro episodio es un
    /// `StateConflict`; un fallo del log es un error de persistencia.
    pub async fn publish(&self, envelope: &ArtifactEnvelope, episode_id: u64, log: &mut dyn PublicationLog) -> Result<Option<PublicationLogEntry>, CoreError> {
        if envelope.episode_id != episode_id {
            return Err(CoreError::StateConflict(format!("artifact from stage '{}' belongs to episode {}, run is episode {}",
                                                        envelope.stage, envelope.episode_id, episode_id)));
        }
        let Some(dispatch) = dispatch_for(&envelope.body) else {
            debug!(stage = %envelope.stage, kind = envelope.body.kind(), "artifact has no publication route");
            return Ok(None);
        };
        let platform = dispatch.platform();
        let outcome = within_deadline(self.deadline, self.call(dispatch, episode_id)).await;

        let (campaign_id, status) = match outcome {
            Ok(id) => {
                info!(episode_id, stage = %envelope.stage, %platform, id = %id, "published");
                (Some(id), PublicationStatus::Published)
            }
            Err(e) => {
                warn!(episode_id, stage = %envelope.stage, %platform, error = %e, "publication failed");
                (None, PublicationStatus::Failed(e.to_string()))
            }
        };
        let entry = PublicationLogEntry { campaign_id,
                                          episode_id,
                                          stage: envelope.stage.clone(),
                                          platform,
                                          status,
                                          published_at: Utc::now() };
        log.append(&entry)?;
        Ok(Some(entry))
    }

    async fn call(&self, dispatch: Dispatch<'_>, episode_id: u64) -> Result<String, CollaboratorError> {
        match dispatch {
            Dispatch::Podcast(audio) => self.podcast.upload(&audio.file_path, episode_id).await,
            Dispatch::Newsletter(n) => self.newsletter.schedule(&n.html, n.header_image_path.as_deref(), episode_id).await,
            Dispatch::Social(post) => self.social.publish(&post.text, post.platform).await,
            Dispatch::Community(items) => self.community.engage(items).await.map(|n| format!("engaged:{n}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeaturedPosts, ScriptArtifact, SocialPlatform};
    use crate::repo::InMemoryPublicationLog;
    use crate::testing::{ops, FakeStudio, RecordedCall};
    use std::path::PathBuf;
    use std::time::Duration;

    fn envelope(episode_id: u64, stage: &str, body: Artifact) -> ArtifactEnvelope {
        ArtifactEnvelope::seal(episode_id, stage, body).unwrap()
    }

    #[test]
    fn routing_table() {
        let audio = Artifact::Audio(AudioArtifact { file_path: "ep.mp3".into(),
                                                    duration: Duration::from_secs(60) });
        let draft = Artifact::Newsletter(NewsletterArtifact { subject: "s".into(),
                                                              html: "<p/>".into(),
                                                              header_image_path: None });
        let finished = Artifact::Newsletter(NewsletterArtifact { subject: "s".into(),
                                                                 html: "<p/>".into(),
                                                                 header_image_path: Some(PathBuf::from("h.png")) });
        let tweet = Artifact::Social(SocialPost { platform: SocialPlatform::Twitter,
                                                  text: "t".into() });
        let none_featured = Artifact::FeaturedPosts(FeaturedPosts { items: vec![] });
        let script = Artifact::Script(ScriptArtifact { text: "t".into(),
                                                       show_notes: String::new() });
        assert_eq!(route(&audio), Some(Platform::Podcast));
        assert_eq!(route(&draft), None);
        assert_eq!(route(&finished), Some(Platform::Newsletter));
        assert_eq!(route(&tweet), Some(Platform::Twitter));
        assert_eq!(route(&none_featured), None);
        assert_eq!(route(&script), None);
    }

    #[tokio::test]
    async fn featured_posts_go_to_community_engager_only() {
        let studio = FakeStudio::new();
        let router = PublicationRouter::new(&studio.collaborators());
        let item = FeedItem::new("https://f/rss", "Featured", "https://f/1", Utc::now());
        let env = envelope(4, "community", Artifact::FeaturedPosts(FeaturedPosts { items: vec![item.clone()] }));
        let mut log = InMemoryPublicationLog::default();

        let entry = router.publish(&env, 4, &mut log).await.unwrap().unwrap();

        assert_eq!(entry.platform, Platform::Community);
        assert!(entry.is_published());
        let calls = studio.calls();
        assert!(calls.contains(&RecordedCall::Engage(vec![item.content_hash.clone()])));
        assert!(!calls.iter().any(|c| matches!(c, RecordedCall::Social { .. })));
        assert_eq!(log.entries().unwrap(), vec![entry]);
    }

    #[tokio::test]
    async fn collaborator_failure_is_logged_without_retry() {
        let studio = FakeStudio::new();
        studio.fail_times(ops::SOCIAL, 5, CollaboratorError::RateLimited("429".into()));
        let router = PublicationRouter::new(&studio.collaborators());
        let env = envelope(2, "social_twitter", Artifact::Social(SocialPost { platform: SocialPlatform::Twitter,
                                                                             text: "hola".into() }));
        let mut log = InMemoryPublicationLog::default();

        let entry = router.publish(&env, 2, &mut log).await.unwrap().unwrap();

        assert!(matches!(entry.status, PublicationStatus::Failed(_)));
        assert_eq!(studio.count(ops::SOCIAL), 1);
        assert_eq!(log.entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn envelope_from_another_episode_is_a_state_conflict() {
        let studio = FakeStudio::new();
        let router = PublicationRouter::new(&studio.collaborators());
        let env = envelope(3, "audio", Artifact::Audio(AudioArtifact { file_path: "a.mp3".into(),
                                                                       duration: Duration::ZERO }));
        let mut log = InMemoryPublicationLog::default();
        assert!(matches!(router.publish(&env, 4, &mut log).await, Err(CoreError::StateConflict(_))));
        assert!(log.entries().unwrap().is_empty());
        assert_eq!(studio.count(ops::UPLOAD), 0);
    }
}
