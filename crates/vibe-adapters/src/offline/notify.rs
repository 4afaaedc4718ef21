use async_trait::async_trait;
use vibe_core::collaborators::Notifier;
use vibe_core::AlertLevel;

/// Notificador que sólo emite eventos de `tracing`.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, level: AlertLevel, message: &str) {
        match level {
            AlertLevel::Info => tracing::info!(target: "vibeflow::notify", "{message}"),
            AlertLevel::Warning => tracing::warn!(target: "vibeflow::notify", "{message}"),
            AlertLevel::Critical => tracing::error!(target: "vibeflow::notify", "{message}"),
        }
    }
}
