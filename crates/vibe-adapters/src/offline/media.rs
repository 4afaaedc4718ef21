//! Renderers de medios offline: narración en texto y cabecera SVG.
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use vibe_core::collaborators::{AudioGenerator, ImageGenerator};
use vibe_core::model::{slugify, AudioArtifact, ScriptArtifact};
use vibe_core::{CollaboratorError, NarrativeBrief};

use super::{escape_html, write_file};

const WORDS_PER_MINUTE: u64 = 150;

/// Escribe el manuscrito de narración y estima su duración a 150 wpm.
pub struct NarrationRenderer {
    dir: PathBuf,
}

impl NarrationRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl AudioGenerator for NarrationRenderer {
    async fn generate_audio_from_script(&self, script: &ScriptArtifact, episode_id: u64) -> Result<AudioArtifact, CollaboratorError> {
        let words = script.text.split_whitespace().count() as u64;
        if words == 0 {
            return Err(CollaboratorError::Malformed("script has no words to narrate".into()));
        }
        let file_path = self.dir.join(format!("EP{episode_id:03}_narration.txt"));
        write_file(&file_path, &script.text).await?;
        Ok(AudioArtifact { file_path,
                           duration: Duration::from_secs(words * 60 / WORDS_PER_MINUTE) })
    }
}

pub struct SvgHeaderRenderer {
    dir: PathBuf,
}

impl SvgHeaderRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ImageGenerator for SvgHeaderRenderer {
    async fn create_newsletter_image(&self, brief: &NarrativeBrief) -> Result<PathBuf, CollaboratorError> {
        let path = self.dir.join(format!("header-{}.svg", slugify(&brief.headline)));
        let svg = format!("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1200\" height=\"400\">\
                           <rect width=\"100%\" height=\"100%\" fill=\"#1b1f3b\"/>\
                           <text x=\"60\" y=\"220\" font-size=\"48\" fill=\"#ffffff\">{}</text></svg>",
                          escape_html(&brief.headline));
        write_file(&path, svg).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn narration_is_written_with_estimated_duration() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = ScriptArtifact { text: "word ".repeat(300),
                                      show_notes: String::new() };
        let audio = NarrationRenderer::new(dir.path()).generate_audio_from_script(&script, 4).await.unwrap();
        assert_eq!(audio.duration, Duration::from_secs(120));
        assert!(audio.file_path.ends_with("EP004_narration.txt"));
        assert!(audio.file_path.exists());
    }
}
