use serde::{Deserialize, Serialize};

/// Estado de una etapa dentro de un run.
///
/// Transiciones válidas:
/// - `Pending` -> `Running` -> `Succeeded` | `Failed`
/// - `Pending` -> `Skipped` (algún predecesor requerido no tuvo éxito)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

impl StageStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StageStatus::Succeeded | StageStatus::Failed | StageStatus::Skipped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Running => "running",
            StageStatus::Succeeded => "succeeded",
            StageStatus::Failed => "failed",
            StageStatus::Skipped => "skipped",
        }
    }
}
