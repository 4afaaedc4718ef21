//! vibe-core: motor de etapas del pipeline semanal de contenido.
//!
//! Modelo de datos, topología validada, ejecución con reintentos y
//! propagación de fallos, router de publicación y contratos de los
//! colaboradores y repositorios.
pub mod collaborators;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod policy;
pub mod repo;
pub mod router;
pub mod stage;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use collaborators::{AlertLevel, Collaborators, QualityVerdict};
pub use engine::{ExecutionMode, PipelineReport, PipelineSeed, RunStatus, StageOutcome, StagePipeline};
pub use errors::{CollaboratorError, CoreError, ErrorClass, StageFailure};
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use model::{Artifact, ArtifactEnvelope, EpisodeHistory, EpisodeState, FeedItem, NarrativeBrief, Platform, PublicationLogEntry, PublicationStatus};
pub use policy::RetryPolicy;
pub use repo::{FingerprintStore, PublicationLog, RunArchive, RunStateRepository};
pub use router::{route, PublicationRouter};
pub use stage::{PipelineDefinition, StageContext, StageDefinition, StageStatus};
