use std::sync::Arc;

use async_trait::async_trait;
use vibe_core::collaborators::AudioGenerator;
use vibe_core::{Artifact, CollaboratorError, StageContext, StageDefinition};

use super::names::{AUDIO, SCRIPT};

pub struct AudioStage {
    renderer: Arc<dyn AudioGenerator>,
}

impl AudioStage {
    pub fn new(renderer: Arc<dyn AudioGenerator>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl StageDefinition for AudioStage {
    fn name(&self) -> &'static str {
        AUDIO
    }

    fn requires(&self) -> &'static [&'static str] {
        &[SCRIPT]
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError> {
        let script = ctx.script(SCRIPT)?;
        let audio = self.renderer.generate_audio_from_script(script, ctx.episode_id).await?;
        Ok(Artifact::Audio(audio))
    }
}
