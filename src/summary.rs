//! Resumen de un run semanal.
//!
//! Es lo que el orquestador devuelve siempre que el run llega a ejecutar el
//! pipeline: desenlaces por etapa, publicaciones, retenciones por calidad y
//! avisos no críticos. Se persiste como `runs/EP{NNN}.json` y su titular va
//! al notificador.
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vibe_core::{PublicationLogEntry, RunEvent, RunStatus, StageOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedFailure {
    pub feed_url: String,
    pub error: String,
}

/// Artifact que no se publicó por no pasar la revisión (`QUALITY_GATE=enforce`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithheldArtifact {
    pub stage: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub episode_id: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    /// `true` si el episodio pasó el checkpoint y quedó confirmado.
    pub committed: bool,
    pub scraped_items: usize,
    pub new_items: usize,
    pub feed_failures: Vec<FeedFailure>,
    pub outcomes: Vec<StageOutcome>,
    pub run_fingerprint: String,
    pub publications: Vec<PublicationLogEntry>,
    pub withheld: Vec<WithheldArtifact>,
    pub transcript: Option<PathBuf>,
    pub warnings: Vec<String>,
    pub events: Vec<RunEvent>,
}

impl RunSummary {
    pub fn published_count(&self) -> usize {
        self.publications.iter().filter(|p| p.is_published()).count()
    }

    /// Todas las etapas con éxito, todo publicado y nada retenido.
    pub fn is_clean(&self) -> bool {
        self.status.is_success() && self.committed && self.published_count() == self.publications.len() && self.withheld.is_empty()
    }

    /// Una línea para logs y notificaciones.
    pub fn headline(&self) -> String {
        let status = match &self.status {
            RunStatus::Success => "success".to_string(),
            RunStatus::PartialFailure { failed, skipped } => {
                format!("partial failure (failed: [{}], skipped: [{}])", failed.join(", "), skipped.join(", "))
            }
        };
        let checkpoint = if self.committed { "committed" } else { "released" };
        format!("EP{:03} {status}; {}/{} published; {} new items; {checkpoint}",
                self.episode_id,
                self.published_count(),
                self.publications.len(),
                self.new_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vibe_core::{Platform, PublicationStatus};

    fn summary(status: RunStatus, publications: Vec<PublicationLogEntry>) -> RunSummary {
        RunSummary { run_id: Uuid::new_v4(),
                     episode_id: 7,
                     started_at: Utc::now(),
                     finished_at: Utc::now(),
                     status,
                     committed: true,
                     scraped_items: 3,
                     new_items: 2,
                     feed_failures: vec![],
                     outcomes: vec![],
                     run_fingerprint: String::new(),
                     publications,
                     withheld: vec![],
                     transcript: None,
                     warnings: vec![],
                     events: vec![] }
    }

    fn entry(platform: Platform, status: PublicationStatus) -> PublicationLogEntry {
        PublicationLogEntry { campaign_id: None,
                              episode_id: 7,
                              stage: "audio".into(),
                              platform,
                              status,
                              published_at: Utc::now() }
    }

    #[test]
    fn headline_lists_failed_and_skipped() {
        let s = summary(RunStatus::PartialFailure { failed: vec!["script".into()],
                                                    skipped: vec!["audio".into()] },
                        vec![entry(Platform::Newsletter, PublicationStatus::Published),
                             entry(Platform::Twitter, PublicationStatus::Failed("429".into()))]);
        assert_eq!(s.headline(),
                   "EP007 partial failure (failed: [script], skipped: [audio]); 1/2 published; 2 new items; committed");
        assert!(!s.is_clean());
    }

    #[test]
    fn clean_run() {
        let s = summary(RunStatus::Success, vec![entry(Platform::Podcast, PublicationStatus::Published)]);
        assert!(s.is_clean());
    }
}
