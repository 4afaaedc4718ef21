//! Publicación offline: cada publicación se registra como un JSON bajo
//! `outbox/<plataforma>/`, con el id que devolvería la plataforma real.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use vibe_core::collaborators::{Analytics, CommunityEngager, NewsletterPublisher, PodcastPublisher, SocialPublisher};
use vibe_core::hashing::hash_str;
use vibe_core::model::{EpisodeStats, SocialPlatform, SocialPost};
use vibe_core::{CollaboratorError, FeedItem};

use super::write_file;

pub struct Outbox {
    dir: PathBuf,
}

impl Outbox {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn record(&self, platform: &str, file_stem: &str, record: Value) -> Result<String, CollaboratorError> {
        let id = format!("{platform}-{}", &hash_str(&record.to_string())[..12]);
        let mut record = record;
        record["id"] = json!(id);
        record["recorded_at"] = json!(Utc::now());
        let body = serde_json::to_vec_pretty(&record).map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
        write_file(&self.dir.join(platform).join(format!("{file_stem}.json")), body).await?;
        tracing::debug!(platform, id = %id, "outbox record written");
        Ok(id)
    }

    async fn count_records(&self, platform: &str, prefix: &str) -> Result<usize, CollaboratorError> {
        let mut entries = match tokio::fs::read_dir(self.dir.join(platform)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let mut n = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().starts_with(prefix) {
                n += 1;
            }
        }
        Ok(n)
    }
}

fn episode_stem(episode_id: u64) -> String {
    format!("EP{episode_id:03}")
}

#[async_trait]
impl PodcastPublisher for Outbox {
    async fn upload(&self, audio_file_path: &Path, episode_id: u64) -> Result<String, CollaboratorError> {
        if !tokio::fs::try_exists(audio_file_path).await? {
            return Err(CollaboratorError::MissingInput(format!("audio file {} not found", audio_file_path.display())));
        }
        self.record("podcast",
                    &episode_stem(episode_id),
                    json!({ "episode_id": episode_id, "audio": audio_file_path }))
            .await
    }
}

#[async_trait]
impl NewsletterPublisher for Outbox {
    async fn schedule(&self, html: &str, image_path: Option<&Path>, episode_id: u64) -> Result<String, CollaboratorError> {
        self.record("newsletter",
                    &episode_stem(episode_id),
                    json!({ "episode_id": episode_id, "html": html, "header_image": image_path }))
            .await
    }
}

#[async_trait]
impl SocialPublisher for Outbox {
    async fn publish(&self, text: &str, platform: SocialPlatform) -> Result<String, CollaboratorError> {
        let thread = SocialPost { platform,
                                  text: text.to_string() }.thread();
        let stem = format!("post-{}", &hash_str(text)[..12]);
        self.record(platform.as_str(), &stem, json!({ "thread": thread })).await
    }
}

#[async_trait]
impl CommunityEngager for Outbox {
    async fn engage(&self, featured_posts: &[FeedItem]) -> Result<u32, CollaboratorError> {
        for post in featured_posts {
            self.record("community",
                        &format!("reply-{}", &post.content_hash[..12.min(post.content_hash.len())]),
                        json!({ "title": post.title, "link": post.link }))
                .await?;
        }
        Ok(featured_posts.len() as u32)
    }
}

#[async_trait]
impl Analytics for Outbox {
    /// Cuenta los registros que dejó el episodio en cada plataforma.
    async fn get_stats(&self, episode_id: u64) -> Result<EpisodeStats, CollaboratorError> {
        let stem = episode_stem(episode_id);
        let mut stats = EpisodeStats::new();
        for platform in ["podcast", "newsletter"] {
            stats.insert(format!("{platform}_records"), self.count_records(platform, &stem).await? as f64);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn long_twitter_post_is_recorded_as_thread() {
        let dir = tempfile::TempDir::new().unwrap();
        let outbox = Outbox::new(dir.path());
        let text = "word ".repeat(100);
        let id = outbox.publish(&text, SocialPlatform::Twitter).await.unwrap();
        assert!(id.starts_with("twitter-"));

        let file = std::fs::read_dir(dir.path().join("twitter")).unwrap().next().unwrap().unwrap();
        let record: Value = serde_json::from_slice(&std::fs::read(file.path()).unwrap()).unwrap();
        let thread = record["thread"].as_array().unwrap();
        assert!(thread.len() > 1);
        assert!(thread.iter().all(|m| m.as_str().unwrap().chars().count() <= 280));
    }

    #[tokio::test]
    async fn upload_requires_existing_audio() {
        let dir = tempfile::TempDir::new().unwrap();
        let outbox = Outbox::new(dir.path().join("outbox"));
        let err = outbox.upload(&dir.path().join("missing.txt"), 1).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::MissingInput(_)));
    }

    #[tokio::test]
    async fn stats_count_previous_episode_records() {
        let dir = tempfile::TempDir::new().unwrap();
        let outbox = Outbox::new(dir.path());
        outbox.schedule("<p>hi</p>", None, 3).await.unwrap();
        let stats = outbox.get_stats(3).await.unwrap();
        assert_eq!(stats["newsletter_records"], 1.0);
        assert_eq!(stats["podcast_records"], 0.0);
        assert_eq!(outbox.get_stats(4).await.unwrap()["newsletter_records"], 0.0);
    }
}
