//! Política de reintentos inyectable.
//!
//! Una `RetryPolicy` agrupa el máximo de intentos, el calendario de backoff
//! (`base * factor^(intento-1)`, acotado por `max_delay`) y la función que
//! clasifica un `CollaboratorError` como transitorio o permanente. Sólo los
//! transitorios se reintentan. Cada intento y cada espera corren bajo el
//! deadline del run, si lo hay.
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::errors::{CollaboratorError, ErrorClass, StageFailure};

pub type Classifier = fn(&CollaboratorError) -> ErrorClass;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
    classify: Classifier,
}

/// Un reintento programado tras un fallo transitorio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryRecord {
    pub attempt: u32,
    pub delay_ms: u64,
    pub error: CollaboratorError,
}

/// Resultado de ejecutar una operación bajo la política.
#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, StageFailure>,
    pub attempts: u32,
    pub retries: Vec<RetryRecord>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), 3, Duration::from_secs(30))
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, factor: u32, max_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1),
               base_delay,
               factor: factor.max(1),
               max_delay,
               classify: CollaboratorError::default_class }
    }

    /// Sin esperas entre intentos.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, 1, Duration::ZERO)
    }

    pub fn with_classifier(mut self, classify: Classifier) -> Self {
        self.classify = classify;
        self
    }

    pub fn classify(&self, error: &CollaboratorError) -> ErrorClass {
        (self.classify)(error)
    }

    /// Espera antes del intento `attempt + 1` (`attempt` empieza en 1).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1);
        let mult = self.factor.checked_pow(exp).unwrap_or(u32::MAX);
        self.base_delay.checked_mul(mult).unwrap_or(self.max_delay).min(self.max_delay)
    }

    /// Ejecuta `op` hasta obtener éxito, un fallo permanente o agotar los
    /// intentos. `op` recibe el número de intento.
    pub async fn run<T, F, Fut>(&self, deadline: Option<Instant>, mut op: F) -> Attempted<T>
        where F: FnMut(u32) -> Fut,
              Fut: Future<Output = Result<T, CollaboratorError>>
    {
        let mut retries = Vec::new();
        let mut attempt = 1;
        loop {
            let error = match within_deadline(deadline, op(attempt)).await {
                Ok(value) => return Attempted { result: Ok(value),
                                                attempts: attempt,
                                                retries },
                Err(error) => error,
            };
            let class = self.classify(&error);
            if class == ErrorClass::Transient && attempt < self.max_attempts {
                let delay = self.backoff_for(attempt);
                retries.push(RetryRecord { attempt,
                                           delay_ms: delay.as_millis() as u64,
                                           error });
                let slept = within_deadline(deadline, async {
                                tokio::time::sleep(delay).await;
                                Ok(())
                            }).await;
                if let Err(deadline_error) = slept {
                    return Attempted { result: Err(StageFailure { class: ErrorClass::Permanent,
                                                                  error: deadline_error,
                                                                  attempts: attempt }),
                                       attempts: attempt,
                                       retries };
                }
                attempt += 1;
                continue;
            }
            return Attempted { result: Err(StageFailure { class,
                                                          error,
                                                          attempts: attempt }),
                               attempts: attempt,
                               retries };
        }
    }
}

/// Corre `fut` acotado por `deadline`; al vencer devuelve `DeadlineExceeded`.
pub async fn within_deadline<T, Fut>(deadline: Option<Instant>, fut: Fut) -> Result<T, CollaboratorError>
    where Fut: Future<Output = Result<T, CollaboratorError>>
{
    match deadline {
        Some(at) => tokio::time::timeout_at(at, fut).await.unwrap_or(Err(CollaboratorError::DeadlineExceeded)),
        None => fut.await,
    }
}
