use std::sync::Arc;

use async_trait::async_trait;
use vibe_core::collaborators::NewsletterGenerator;
use vibe_core::{Artifact, CollaboratorError, StageContext, StageDefinition};

use super::names::{NEWSLETTER, SYNTHESIS};

/// Produce el borrador del newsletter; la imagen de cabecera la agrega la
/// etapa `image`.
pub struct NewsletterStage {
    writer: Arc<dyn NewsletterGenerator>,
}

impl NewsletterStage {
    pub fn new(writer: Arc<dyn NewsletterGenerator>) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl StageDefinition for NewsletterStage {
    fn name(&self) -> &'static str {
        NEWSLETTER
    }

    fn requires(&self) -> &'static [&'static str] {
        &[SYNTHESIS]
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError> {
        let brief = ctx.brief(SYNTHESIS)?;
        let mut draft = self.writer.generate_newsletter_content(brief, ctx.episode_id).await?;
        if draft.html.trim().is_empty() {
            return Err(CollaboratorError::Generation("newsletter html is empty".into()));
        }
        draft.header_image_path = None;
        Ok(Artifact::Newsletter(draft))
    }
}
