use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;
use vibe_core::collaborators::Synthesizer;
use vibe_core::{Artifact, CollaboratorError, StageContext, StageDefinition};

use super::names::SYNTHESIS;

/// Deriva el tema narrativo de la semana a partir de los items nuevos.
pub struct SynthesisStage {
    synthesizer: Arc<dyn Synthesizer>,
}

impl SynthesisStage {
    pub fn new(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self { synthesizer }
    }
}

#[async_trait]
impl StageDefinition for SynthesisStage {
    fn name(&self) -> &'static str {
        SYNTHESIS
    }

    fn requires(&self) -> &'static [&'static str] {
        &[]
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError> {
        if ctx.items.is_empty() {
            return Err(CollaboratorError::MissingInput("no new feed items this week".into()));
        }
        let mut brief = self.synthesizer.develop_narrative_theme(ctx.items, ctx.insights, ctx.history).await?;
        if brief.supporting_items.is_empty() {
            return Err(CollaboratorError::Generation("brief has no supporting items".into()));
        }
        // destacados fuera de supporting_items no se publican
        let supporting = brief.supporting_items.clone();
        let before = brief.featured_posts.len();
        brief.featured_posts.retain(|f| supporting.iter().any(|s| s.content_hash == f.content_hash));
        if brief.featured_posts.len() < before {
            warn!(dropped = before - brief.featured_posts.len(), "featured posts outside supporting items dropped");
        }
        Ok(Artifact::Brief(brief))
    }
}
