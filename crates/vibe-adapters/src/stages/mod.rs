//! Etapas de la topología semanal.
//!
//! | # | etapa | requiere |
//! |---|---|---|
//! | 0 | synthesis | - |
//! | 1 | script | synthesis |
//! | 2 | newsletter | synthesis |
//! | 3 | audio | script |
//! | 4 | image | synthesis, newsletter |
//! | 5 | social_twitter | synthesis |
//! | 6 | social_linkedin | synthesis |
//! | 7 | community | synthesis |

mod audio;
mod community;
mod image;
mod newsletter;
mod script;
mod social;
mod synthesis;

pub use audio::AudioStage;
pub use community::CommunityStage;
pub use image::ImageStage;
pub use newsletter::NewsletterStage;
pub use script::ScriptStage;
pub use social::{compose_post, SocialStage};
pub use synthesis::SynthesisStage;

use vibe_core::model::SocialPlatform;
use vibe_core::{Collaborators, CoreError, PipelineDefinition, StageDefinition};

pub mod names {
    pub const SYNTHESIS: &str = "synthesis";
    pub const SCRIPT: &str = "script";
    pub const NEWSLETTER: &str = "newsletter";
    pub const AUDIO: &str = "audio";
    pub const IMAGE: &str = "image";
    pub const SOCIAL_TWITTER: &str = "social_twitter";
    pub const SOCIAL_LINKEDIN: &str = "social_linkedin";
    pub const COMMUNITY: &str = "community";
}

/// Topología fija del pipeline semanal, en orden de prioridad.
pub fn weekly_topology(c: &Collaborators) -> Result<PipelineDefinition, CoreError> {
    let stages: Vec<Box<dyn StageDefinition>> = vec![Box::new(SynthesisStage::new(c.synthesizer.clone())),
                                                     Box::new(ScriptStage::new(c.script_writer.clone())),
                                                     Box::new(NewsletterStage::new(c.newsletter_writer.clone())),
                                                     Box::new(AudioStage::new(c.audio.clone())),
                                                     Box::new(ImageStage::new(c.image.clone())),
                                                     Box::new(SocialStage::new(SocialPlatform::Twitter)),
                                                     Box::new(SocialStage::new(SocialPlatform::LinkedIn)),
                                                     Box::new(CommunityStage)];
    PipelineDefinition::new(stages)
}
