use async_trait::async_trait;
use vibe_core::constants::FEATURED_POSTS_LIMIT;
use vibe_core::model::FeaturedPosts;
use vibe_core::{Artifact, CollaboratorError, FeedItem, StageContext, StageDefinition};

use super::names::{COMMUNITY, SYNTHESIS};

/// Curación de comunidad: los primeros destacados del brief (a lo sumo
/// `FEATURED_POSTS_LIMIT`), sólo si están entre los items de apoyo.
pub struct CommunityStage;

#[async_trait]
impl StageDefinition for CommunityStage {
    fn name(&self) -> &'static str {
        COMMUNITY
    }

    fn requires(&self) -> &'static [&'static str] {
        &[SYNTHESIS]
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError> {
        let brief = ctx.brief(SYNTHESIS)?;
        let mut items: Vec<FeedItem> = Vec::with_capacity(FEATURED_POSTS_LIMIT);
        for post in &brief.featured_posts {
            if items.len() == FEATURED_POSTS_LIMIT {
                break;
            }
            if brief.supports(post) && !items.iter().any(|i| i.content_hash == post.content_hash) {
                items.push(post.clone());
            }
        }
        Ok(Artifact::FeaturedPosts(FeaturedPosts { items }))
    }
}
