use async_trait::async_trait;

use super::StageContext;
use crate::errors::CollaboratorError;
use crate::model::Artifact;
use crate::policy::RetryPolicy;

/// Contrato de una etapa: declara sus predecesores requeridos y produce un
/// único artifact a partir de sus salidas.
///
/// Los errores devueltos se clasifican con la política de reintentos; una
/// etapa nunca debe entrar en pánico por inputs inválidos, sino devolver
/// `Malformed` o `MissingInput`.
#[async_trait]
pub trait StageDefinition: Send + Sync {
    /// Nombre estable y único dentro de la topología.
    fn name(&self) -> &'static str;

    /// Predecesores requeridos. Deben declararse antes en la topología.
    fn requires(&self) -> &'static [&'static str];

    /// Política propia; `None` usa la del pipeline.
    fn retry_policy(&self) -> Option<&RetryPolicy> {
        None
    }

    async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError>;
}
