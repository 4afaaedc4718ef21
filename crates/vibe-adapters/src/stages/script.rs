use std::sync::Arc;

use async_trait::async_trait;
use vibe_core::collaborators::ScriptGenerator;
use vibe_core::{Artifact, CollaboratorError, StageContext, StageDefinition};

use super::names::{SCRIPT, SYNTHESIS};

pub struct ScriptStage {
    writer: Arc<dyn ScriptGenerator>,
}

impl ScriptStage {
    pub fn new(writer: Arc<dyn ScriptGenerator>) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl StageDefinition for ScriptStage {
    fn name(&self) -> &'static str {
        SCRIPT
    }

    fn requires(&self) -> &'static [&'static str] {
        &[SYNTHESIS]
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError> {
        let brief = ctx.brief(SYNTHESIS)?;
        let script = self.writer.generate_podcast_script(brief, ctx.episode_id).await?;
        if script.text.trim().is_empty() {
            return Err(CollaboratorError::Generation("script is empty".into()));
        }
        Ok(Artifact::Script(script))
    }
}
