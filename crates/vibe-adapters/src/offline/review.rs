//! Revisor heurístico: comprobaciones baratas por tipo de artifact.
use async_trait::async_trait;
use vibe_core::collaborators::QualityReviewer;
use vibe_core::{Artifact, QualityVerdict};

const MIN_SCRIPT_WORDS: usize = 20;

pub struct HeuristicReviewer;

#[async_trait]
impl QualityReviewer for HeuristicReviewer {
    async fn review(&self, artifact: &Artifact) -> QualityVerdict {
        match artifact {
            Artifact::Script(s) if s.text.split_whitespace().count() < MIN_SCRIPT_WORDS => {
                QualityVerdict::fail(format!("script shorter than {MIN_SCRIPT_WORDS} words"))
            }
            Artifact::Audio(a) if a.duration.is_zero() => QualityVerdict::fail("audio has zero duration"),
            Artifact::Newsletter(n) if n.subject.trim().is_empty() => QualityVerdict::fail("newsletter has no subject"),
            Artifact::Newsletter(n) if n.html.contains("{{") => QualityVerdict::fail("newsletter has unrendered template markers"),
            Artifact::Social(p) if p.text.trim().is_empty() => QualityVerdict::fail("empty social post"),
            Artifact::FeaturedPosts(f) if f.items.is_empty() => QualityVerdict::fail("no featured posts to engage"),
            _ => QualityVerdict::pass(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vibe_core::model::{AudioArtifact, SocialPlatform, SocialPost};

    #[tokio::test]
    async fn flags_empty_outputs() {
        let audio = Artifact::Audio(AudioArtifact { file_path: "a.txt".into(),
                                                    duration: Duration::ZERO });
        assert!(!HeuristicReviewer.review(&audio).await.passed);
        let post = Artifact::Social(SocialPost { platform: SocialPlatform::LinkedIn,
                                                 text: "Episode 1: Rust".into() });
        assert!(HeuristicReviewer.review(&post).await.passed);
    }
}
