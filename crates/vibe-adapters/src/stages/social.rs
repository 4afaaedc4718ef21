//! Posts sociales armados localmente a partir del brief.
//!
//! Sólo citan items de apoyo que no son destacados: los destacados van por
//! el engagement de comunidad.
use async_trait::async_trait;
use vibe_core::constants::SOCIAL_HEADLINES_LIMIT;
use vibe_core::model::{SocialPlatform, SocialPost};
use vibe_core::{Artifact, CollaboratorError, NarrativeBrief, StageContext, StageDefinition};

use super::names::{SOCIAL_LINKEDIN, SOCIAL_TWITTER, SYNTHESIS};

const SHOW_NAME: &str = "Vibe Dev Podcast";
const LINKEDIN_TAGS: &str = "#MCP #AI #MachineLearning #Podcast #TechNews";

pub struct SocialStage {
    platform: SocialPlatform,
}

impl SocialStage {
    pub fn new(platform: SocialPlatform) -> Self {
        Self { platform }
    }
}

/// Texto del post para `platform`, con hasta tres titulares no destacados.
pub fn compose_post(brief: &NarrativeBrief, episode_id: u64, platform: SocialPlatform) -> String {
    let bullets: Vec<String> = brief.broadcast_items()
                                    .take(SOCIAL_HEADLINES_LIMIT)
                                    .map(|i| format!("• {}", i.title))
                                    .collect();
    let title = format!("Episode {episode_id}: {}", brief.headline);
    let mut post = match platform {
        SocialPlatform::Twitter => format!("🎙️ New episode of {SHOW_NAME} is out!\n\n{title}"),
        SocialPlatform::LinkedIn => format!("🎙️ Excited to share the latest episode of the {SHOW_NAME}!\n\n{title}\n\n{}", brief.theme_summary),
    };
    if !bullets.is_empty() {
        let heading = match platform {
            SocialPlatform::Twitter => "This week:",
            SocialPlatform::LinkedIn => "Key topics covered:",
        };
        post.push_str(&format!("\n\n{heading}\n{}", bullets.join("\n")));
    }
    if platform == SocialPlatform::LinkedIn {
        post.push_str(&format!("\n\n{LINKEDIN_TAGS}"));
    }
    post
}

#[async_trait]
impl StageDefinition for SocialStage {
    fn name(&self) -> &'static str {
        match self.platform {
            SocialPlatform::Twitter => SOCIAL_TWITTER,
            SocialPlatform::LinkedIn => SOCIAL_LINKEDIN,
        }
    }

    fn requires(&self) -> &'static [&'static str] {
        &[SYNTHESIS]
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError> {
        let brief = ctx.brief(SYNTHESIS)?;
        Ok(Artifact::Social(SocialPost { platform: self.platform,
                                         text: compose_post(brief, ctx.episode_id, self.platform) }))
    }
}
