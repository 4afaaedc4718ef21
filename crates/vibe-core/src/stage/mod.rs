//! Etapas: contrato, contexto de ejecución, estados y topología validada.

mod context;
mod definition;
mod status;
mod topology;

pub use context::StageContext;
pub use definition::StageDefinition;
pub use status::StageStatus;
pub use topology::PipelineDefinition;
