//! Stage engine: ejecución de la topología con reintentos, propagación de
//! `Skipped`, eventos y fingerprint de run.

mod core;
mod report;

pub use self::core::{ExecutionMode, PipelineSeed, StagePipeline};
pub use self::report::{PipelineReport, RunStatus, StageOutcome};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CollaboratorError;
    use crate::event::RunEventKind;
    use crate::model::{Artifact, ScriptArtifact};
    use crate::policy::RetryPolicy;
    use crate::stage::{PipelineDefinition, StageContext, StageDefinition, StageStatus};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // Etapa de prueba: falla con los errores encolados y luego tiene éxito.
    struct ScriptedStage {
        name: &'static str,
        requires: &'static [&'static str],
        failures: Mutex<VecDeque<CollaboratorError>>,
        calls: Arc<AtomicU32>,
        delay: Option<Duration>,
        policy: Option<RetryPolicy>,
    }

    impl ScriptedStage {
        fn new(name: &'static str, requires: &'static [&'static str]) -> Self {
            Self { name,
                   requires,
                   failures: Mutex::new(VecDeque::new()),
                   calls: Arc::new(AtomicU32::new(0)),
                   delay: None,
                   policy: None }
        }
        fn failing(self, errors: Vec<CollaboratorError>) -> Self {
            *self.failures.lock().unwrap() = errors.into();
            self
        }
        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
        fn with_policy(mut self, policy: RetryPolicy) -> Self {
            self.policy = Some(policy);
            self
        }
    }

    #[async_trait]
    impl StageDefinition for ScriptedStage {
        fn name(&self) -> &'static str {
            self.name
        }
        fn requires(&self) -> &'static [&'static str] {
            self.requires
        }
        fn retry_policy(&self) -> Option<&RetryPolicy> {
            self.policy.as_ref()
        }
        async fn run(&self, ctx: &StageContext<'_>) -> Result<Artifact, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            if let Some(e) = self.failures.lock().unwrap().pop_front() {
                return Err(e);
            }
            for req in self.requires {
                ctx.input(req)?;
            }
            Ok(Artifact::Script(ScriptArtifact { text: format!("{} for episode {}", self.name, ctx.episode_id),
                                                 show_notes: String::new() }))
        }
    }

    // root -> {left, right}; left -> tail
    fn diamond(left: ScriptedStage) -> (PipelineDefinition, Arc<AtomicU32>, Arc<AtomicU32>) {
        let tail = ScriptedStage::new("tail", &["left"]);
        let (left_calls, tail_calls) = (left.calls.clone(), tail.calls.clone());
        let stages: Vec<Box<dyn StageDefinition>> = vec![Box::new(ScriptedStage::new("root", &[])),
                                                         Box::new(left),
                                                         Box::new(ScriptedStage::new("right", &["root"])),
                                                         Box::new(tail)];
        (PipelineDefinition::new(stages).unwrap(), left_calls, tail_calls)
    }

    fn seed() -> PipelineSeed {
        PipelineSeed { episode_id: 7,
                       ..Default::default() }
    }

    #[tokio::test]
    async fn all_stages_succeed_in_priority_order() {
        let (def, _, _) = diamond(ScriptedStage::new("left", &["root"]));
        let mut pipeline = StagePipeline::new(def, RetryPolicy::immediate(3));
        let report = pipeline.run(&seed(), None).await;

        assert_eq!(report.status, RunStatus::Success);
        assert_eq!(report.execution_order(), vec!["root", "left", "right", "tail"]);
        assert!(matches!(report.events.first().map(|e| &e.kind), Some(RunEventKind::RunInitialized { episode_id: 7, .. })));
        assert!(matches!(report.events.last().map(|e| &e.kind), Some(RunEventKind::RunCompleted { .. })));
        assert!(report.artifacts.values().all(|a| a.episode_id == 7));
        let leaves: Vec<&str> = report.terminal_artifacts().iter().map(|a| a.stage.as_str()).collect();
        assert_eq!(leaves, vec!["right", "tail"]);
    }

    #[tokio::test]
    async fn identical_runs_share_fingerprint() {
        let (def_a, _, _) = diamond(ScriptedStage::new("left", &["root"]));
        let (def_b, _, _) = diamond(ScriptedStage::new("left", &["root"]));
        let a = StagePipeline::new(def_a, RetryPolicy::immediate(1)).run(&seed(), None).await;
        let b = StagePipeline::new(def_b, RetryPolicy::immediate(1)).run(&seed(), None).await;
        assert_eq!(a.run_fingerprint, b.run_fingerprint);
        assert_ne!(a.run_id, b.run_id);
    }

    #[tokio::test]
    async fn permanent_failure_skips_only_dependents() {
        let left = ScriptedStage::new("left", &["root"]).failing(vec![CollaboratorError::Malformed("bad brief".into())]);
        let (def, left_calls, tail_calls) = diamond(left);
        let report = StagePipeline::new(def, RetryPolicy::immediate(3)).run(&seed(), None).await;

        assert_eq!(report.status,
                   RunStatus::PartialFailure { failed: vec!["left".into()],
                                               skipped: vec!["tail".into()] });
        assert_eq!(left_calls.load(Ordering::SeqCst), 1, "permanent: un solo intento");
        assert_eq!(tail_calls.load(Ordering::SeqCst), 0, "skipped: nunca se intenta");
        assert_eq!(report.status_of("right"), Some(StageStatus::Succeeded));
        assert_eq!(report.outcome("tail").and_then(|o| o.blocked_by.clone()), Some("left".to_string()));
        assert!(report.artifact("tail").is_none());
    }

    #[tokio::test]
    async fn transient_failure_is_retried_then_succeeds() {
        let left = ScriptedStage::new("left", &["root"]).failing(vec![CollaboratorError::Network("reset".into())]);
        let (def, left_calls, _) = diamond(left);
        let report = StagePipeline::new(def, RetryPolicy::immediate(3)).run(&seed(), None).await;

        assert_eq!(report.status, RunStatus::Success);
        assert_eq!(left_calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.outcome("left").map(|o| o.attempts), Some(2));
        let retries = report.events
                            .iter()
                            .filter(|e| matches!(&e.kind, RunEventKind::StageRetryScheduled { stage, .. } if stage == "left"))
                            .count();
        assert_eq!(retries, 1);
    }

    #[tokio::test]
    async fn transient_failures_stop_at_max_attempts() {
        let errors = (0..5).map(|_| CollaboratorError::Timeout("slow".into())).collect();
        let (def, left_calls, _) = diamond(ScriptedStage::new("left", &["root"]).failing(errors));
        let report = StagePipeline::new(def, RetryPolicy::immediate(3)).run(&seed(), None).await;

        assert_eq!(left_calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.status_of("left"), Some(StageStatus::Failed));
        assert_eq!(report.status_of("tail"), Some(StageStatus::Skipped));
    }

    #[tokio::test]
    async fn stage_policy_overrides_pipeline_policy() {
        let left = ScriptedStage::new("left", &["root"]).failing(vec![CollaboratorError::Network("a".into()),
                                                                      CollaboratorError::Network("b".into())])
                                                        .with_policy(RetryPolicy::immediate(1));
        let (def, left_calls, _) = diamond(left);
        let report = StagePipeline::new(def, RetryPolicy::immediate(5)).run(&seed(), None).await;
        assert_eq!(left_calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.status_of("left"), Some(StageStatus::Failed));
    }

    #[tokio::test]
    async fn concurrent_mode_records_waves_in_priority_order() {
        let left = ScriptedStage::new("left", &["root"]).failing(vec![CollaboratorError::Auth("401".into())]);
        let (def, _, _) = diamond(left);
        let report = StagePipeline::new(def, RetryPolicy::immediate(1)).with_mode(ExecutionMode::Concurrent)
                                                                       .run(&seed(), None)
                                                                       .await;
        let order: Vec<&str> = report.outcomes.iter().map(|o| o.stage.as_str()).collect();
        assert_eq!(order, vec!["root", "left", "right", "tail"]);
        assert_eq!(report.status,
                   RunStatus::PartialFailure { failed: vec!["left".into()],
                                               skipped: vec!["tail".into()] });
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fails_in_flight_stage_and_skips_dependents() {
        let left = ScriptedStage::new("left", &["root"]).slow(Duration::from_secs(3600));
        let (def, _, tail_calls) = diamond(left);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        let report = StagePipeline::new(def, RetryPolicy::immediate(3)).run(&seed(), Some(deadline)).await;

        let left = report.outcome("left").unwrap();
        assert_eq!(left.status, StageStatus::Failed);
        assert_eq!(left.failure.as_ref().map(|f| f.error.clone()), Some(CollaboratorError::DeadlineExceeded));
        assert_eq!(report.status_of("tail"), Some(StageStatus::Skipped));
        assert_eq!(tail_calls.load(Ordering::SeqCst), 0);
    }
}
