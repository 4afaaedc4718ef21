//! Generadores de texto por plantilla (sin modelos generativos).
use async_trait::async_trait;
use vibe_core::collaborators::{NewsletterGenerator, ScriptGenerator, Synthesizer};
use vibe_core::constants::FEATURED_POSTS_LIMIT;
use vibe_core::model::{EpisodeHistory, EpisodeStats, NewsletterArtifact, ScriptArtifact};
use vibe_core::{CollaboratorError, FeedItem, NarrativeBrief};

use super::escape_html;

/// Titulares previos que se nombran en las directivas de tono.
const RECENT_TOPICS_IN_TONE: usize = 3;

pub struct TemplateSynthesizer;

#[async_trait]
impl Synthesizer for TemplateSynthesizer {
    async fn develop_narrative_theme(&self,
                                     items: &[FeedItem],
                                     insights: Option<&EpisodeStats>,
                                     history: &EpisodeHistory)
                                     -> Result<NarrativeBrief, CollaboratorError> {
        let mut ordered = items.to_vec();
        ordered.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        // titular: el item más nuevo que no haya sido titular antes
        let Some(lead) = ordered.iter().find(|i| !history.covers(&i.title)).or(ordered.first()) else {
            return Err(CollaboratorError::MissingInput("no items to synthesize".into()));
        };
        let headline = lead.title.clone();
        let titles: Vec<&str> = ordered.iter().map(|i| i.title.as_str()).collect();
        let mut tone = vec!["conversational".to_string(), "developer-focused".to_string()];
        if let Some((metric, value)) = insights.and_then(|s| s.iter().max_by(|a, b| a.1.total_cmp(b.1))) {
            tone.push(format!("build on last episode's strongest signal: {metric} = {value}"));
        }
        let recent: Vec<&str> = history.past_topics.iter().rev().take(RECENT_TOPICS_IN_TONE).map(String::as_str).collect();
        if !recent.is_empty() {
            tone.push(format!("do not revisit recent episodes: {}", recent.join("; ")));
        }
        Ok(NarrativeBrief { headline,
                            theme_summary: format!("This week ties together {} stories: {}.", titles.len(), titles.join("; ")),
                            featured_posts: ordered.iter().take(FEATURED_POSTS_LIMIT).cloned().collect(),
                            supporting_items: ordered,
                            tone_directives: tone })
    }
}

pub struct TemplateScriptWriter;

#[async_trait]
impl ScriptGenerator for TemplateScriptWriter {
    async fn generate_podcast_script(&self, brief: &NarrativeBrief, episode_id: u64) -> Result<ScriptArtifact, CollaboratorError> {
        let mut text = format!("Welcome to episode {episode_id} of Vibe Dev. {}\n\n{}\n", brief.headline, brief.theme_summary);
        for (n, item) in brief.supporting_items.iter().enumerate() {
            text.push_str(&format!("\nStory {}: {}.", n + 1, item.title));
        }
        text.push_str("\n\nThat's it for this week. Keep building.\n");
        let show_notes = brief.supporting_items
                              .iter()
                              .map(|i| format!("- [{}]({})", i.title, i.link))
                              .collect::<Vec<_>>()
                              .join("\n");
        Ok(ScriptArtifact { text, show_notes })
    }
}

pub struct TemplateNewsletterWriter;

#[async_trait]
impl NewsletterGenerator for TemplateNewsletterWriter {
    async fn generate_newsletter_content(&self, brief: &NarrativeBrief, episode_id: u64) -> Result<NewsletterArtifact, CollaboratorError> {
        let items: String = brief.supporting_items
                                 .iter()
                                 .map(|i| format!("<li><a href=\"{}\">{}</a></li>", escape_html(&i.link), escape_html(&i.title)))
                                 .collect();
        let html = format!("<html><body><h1>{}</h1><p>{}</p><ul>{}</ul><p>Episode {episode_id} is out now.</p></body></html>",
                           escape_html(&brief.headline),
                           escape_html(&brief.theme_summary),
                           items);
        Ok(NewsletterArtifact { subject: format!("Vibe Dev #{episode_id}: {}", brief.headline),
                                html,
                                header_image_path: None })
    }
}
