use indexmap::IndexMap;

use crate::errors::CollaboratorError;
use crate::model::{Artifact, ArtifactEnvelope, EpisodeHistory, EpisodeStats, FeedItem, NarrativeBrief, NewsletterArtifact, ScriptArtifact};

/// Inputs de una etapa: las salidas de sus predecesores requeridos más la
/// semilla del run (items nuevos, insights de analytics e historial).
#[derive(Debug)]
pub struct StageContext<'a> {
    pub episode_id: u64,
    pub items: &'a [FeedItem],
    pub insights: Option<&'a EpisodeStats>,
    pub history: &'a EpisodeHistory,
    pub inputs: IndexMap<&'static str, &'a ArtifactEnvelope>,
}

impl<'a> StageContext<'a> {
    pub fn new(episode_id: u64, items: &'a [FeedItem], insights: Option<&'a EpisodeStats>, history: &'a EpisodeHistory) -> Self {
        Self { episode_id,
               items,
               insights,
               history,
               inputs: IndexMap::new() }
    }

    pub fn with_input(mut self, stage: &'static str, envelope: &'a ArtifactEnvelope) -> Self {
        self.inputs.insert(stage, envelope);
        self
    }

    pub fn input(&self, stage: &str) -> Result<&'a Artifact, CollaboratorError> {
        self.inputs
            .get(stage)
            .map(|env| &env.body)
            .ok_or_else(|| CollaboratorError::MissingInput(format!("output of '{stage}'")))
    }

    pub fn brief(&self, stage: &str) -> Result<&'a NarrativeBrief, CollaboratorError> {
        match self.input(stage)? {
            Artifact::Brief(b) => Ok(b),
            other => Err(unexpected(stage, "brief", other)),
        }
    }

    pub fn script(&self, stage: &str) -> Result<&'a ScriptArtifact, CollaboratorError> {
        match self.input(stage)? {
            Artifact::Script(s) => Ok(s),
            other => Err(unexpected(stage, "script", other)),
        }
    }

    pub fn newsletter(&self, stage: &str) -> Result<&'a NewsletterArtifact, CollaboratorError> {
        match self.input(stage)? {
            Artifact::Newsletter(n) => Ok(n),
            other => Err(unexpected(stage, "newsletter", other)),
        }
    }
}

fn unexpected(stage: &str, wanted: &str, got: &Artifact) -> CollaboratorError {
    CollaboratorError::Malformed(format!("'{stage}' produced {} where {wanted} was expected", got.kind()))
}
