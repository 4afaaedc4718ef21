use serde::{Deserialize, Serialize};

use super::FeedItem;

/// Tema narrativo de la semana. Se produce una vez por run en la etapa de
/// síntesis y es de sólo lectura para las etapas siguientes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeBrief {
    pub headline: String,
    pub theme_summary: String,
    pub supporting_items: Vec<FeedItem>,
    pub tone_directives: Vec<String>,
    /// Subconjunto de `supporting_items` elegido para engagement de comunidad.
    #[serde(default)]
    pub featured_posts: Vec<FeedItem>,
}

impl NarrativeBrief {
    pub fn is_featured(&self, item: &FeedItem) -> bool {
        self.featured_posts.iter().any(|f| f.content_hash == item.content_hash)
    }

    pub fn supports(&self, item: &FeedItem) -> bool {
        self.supporting_items.iter().any(|s| s.content_hash == item.content_hash)
    }

    /// Items de apoyo que no son destacados, en el orden del brief.
    pub fn broadcast_items(&self) -> impl Iterator<Item = &FeedItem> {
        self.supporting_items.iter().filter(move |i| !self.is_featured(i))
    }
}
