use std::sync::Arc;

use async_trait::async_trait;
use vibe_core::collaborators::ImageGenerator;
use vibe_core::model::NewsletterArtifact;
use vibe_core::{Artifact, CollaboratorError, StageContext, StageDefinition};

use super::names::{IMAGE, NEWSLETTER, SYNTHESIS};

/// Completa el borrador del newsletter con su imagen de cabecera.
pub struct ImageStage {
    renderer: Arc<dyn ImageGenerator>,
}

impl ImageStage {
    pub fn new(renderer: Arc<dyn ImageGenerator>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl StageDefinition for ImageStage {
    fn name(&self) -> &'static str {
        IMAGE
    }

    fn requires(&self) -> &'static [&'static str] {
        &[SYNTHESIS, NEWSLETTER]
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError> {
        let brief = ctx.brief(SYNTHESIS)?;
        let draft = ctx.newsletter(NEWSLETTER)?;
        let header = self.renderer.create_newsletter_image(brief).await?;
        Ok(Artifact::Newsletter(NewsletterArtifact { header_image_path: Some(header),
                                                     ..draft.clone() }))
    }
}
