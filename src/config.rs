//! Configuración central de la aplicación.
//! Carga variables de entorno (.env vía `vibe_persistence::init_dotenv`) y
//! las valida una sola vez al arrancar: un valor inválido es un
//! `ConfigError`, nunca un default silencioso.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{TimeDelta, Weekday};
use vibe_core::{ExecutionMode, RetryPolicy};
use vibe_persistence::{init_dotenv, DataLayout};

use crate::errors::ConfigError;
use crate::schedule::WeeklySchedule;

/// Qué hacer con un artifact que no pasa la revisión de calidad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityGate {
    /// Se registra el veredicto y se publica igual.
    #[default]
    Advisory,
    /// No se publica; queda en el resumen como retenido.
    Enforce,
}

impl FromStr for QualityGate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(QualityGate::Advisory),
            "enforce" => Ok(QualityGate::Enforce),
            other => Err(format!("expected 'advisory' or 'enforce', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Raíz del estado persistido.
    pub data_dir: PathBuf,
    pub sources_path: PathBuf,
    /// Salidas de los colaboradores offline.
    pub output_dir: PathBuf,
    pub stage_max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_factor: u32,
    pub backoff_max: Duration,
    pub run_deadline: Duration,
    pub default_lookback: TimeDelta,
    pub concurrent: bool,
    pub quality_gate: QualityGate,
    pub schedule: WeeklySchedule,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        init_dotenv();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Igual que `from_env` pero leyendo de `lookup` (tests, overrides).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
        where F: Fn(&str) -> Option<String>
    {
        let vars = Vars(lookup);
        let weekday: Weekday = vars.parse("SCHEDULE_WEEKDAY", "mon")?;
        let hour: u32 = vars.parse("SCHEDULE_HOUR", "9")?;
        let schedule = WeeklySchedule::new(weekday, hour).ok_or_else(|| ConfigError::InvalidVar { var: "SCHEDULE_HOUR",
                                                                                                  value: hour.to_string(),
                                                                                                  reason: "hour must be 0-23".into() })?;
        let stage_max_attempts: u32 = vars.parse("STAGE_MAX_ATTEMPTS", "3")?;
        if stage_max_attempts == 0 {
            return Err(ConfigError::InvalidVar { var: "STAGE_MAX_ATTEMPTS",
                                                 value: "0".into(),
                                                 reason: "at least one attempt is required".into() });
        }
        let run_deadline = deadline_minutes(vars.parse("RUN_DEADLINE_MINUTES", "90")?)?;
        let default_lookback = lookback_hours(vars.parse("DEFAULT_LOOKBACK_HOURS", "24")?)?;
        Ok(Self { data_dir: vars.path("DATA_DIR", "data"),
                  sources_path: vars.path("SOURCES_PATH", "config/sources.json"),
                  output_dir: vars.path("OUTPUT_DIR", "output"),
                  stage_max_attempts,
                  backoff_base: Duration::from_millis(vars.parse("STAGE_BACKOFF_MS", "500")?),
                  backoff_factor: vars.parse("STAGE_BACKOFF_FACTOR", "3")?,
                  backoff_max: Duration::from_millis(vars.parse("STAGE_BACKOFF_MAX_MS", "30000")?),
                  run_deadline,
                  default_lookback,
                  concurrent: vars.parse("PIPELINE_CONCURRENT", "false")?,
                  quality_gate: vars.parse("QUALITY_GATE", "advisory")?,
                  schedule })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.stage_max_attempts, self.backoff_base, self.backoff_factor, self.backoff_max)
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        if self.concurrent {
            ExecutionMode::Concurrent
        } else {
            ExecutionMode::Sequential
        }
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
    }
}

fn deadline_minutes(minutes: u64) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidVar { var: "RUN_DEADLINE_MINUTES",
                                                           value: minutes.to_string(),
                                                           reason: reason.into() };
    if minutes == 0 {
        return Err(invalid("deadline must be positive"));
    }
    minutes.checked_mul(60).map(Duration::from_secs).ok_or_else(|| invalid("deadline out of range"))
}

// Una ventana negativa apuntaría al futuro y descartaría todos los items.
fn lookback_hours(hours: i64) -> Result<TimeDelta, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidVar { var: "DEFAULT_LOOKBACK_HOURS",
                                                           value: hours.to_string(),
                                                           reason: reason.into() };
    if hours <= 0 {
        return Err(invalid("lookback must be positive"));
    }
    TimeDelta::try_hours(hours).filter(|d| *d <= max_lookback())
                               .ok_or_else(|| invalid("lookback out of range"))
}

/// Ventana más larga que se acepta: cien años.
fn max_lookback() -> TimeDelta {
    TimeDelta::days(36_500)
}

struct Vars<F>(F);

impl<F> Vars<F> where F: Fn(&str) -> Option<String>
{
    fn raw(&self, var: &str) -> Option<String> {
        (self.0)(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn path(&self, var: &str, default: &str) -> PathBuf {
        PathBuf::from(self.raw(var).unwrap_or_else(|| default.to_string()))
    }

    fn parse<T>(&self, var: &'static str, default: &str) -> Result<T, ConfigError>
        where T: FromStr,
              T::Err: ToString
    {
        let value = self.raw(var).unwrap_or_else(|| default.to_string());
        value.parse().map_err(|e: T::Err| ConfigError::InvalidVar { var,
                                                                      reason: e.to_string(),
                                                                      value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = config(&[]).unwrap();
        assert_eq!(c.data_dir, PathBuf::from("data"));
        assert_eq!(c.sources_path, PathBuf::from("config/sources.json"));
        assert_eq!(c.stage_max_attempts, 3);
        assert_eq!(c.backoff_base, Duration::from_millis(500));
        assert_eq!(c.run_deadline, Duration::from_secs(90 * 60));
        assert_eq!(c.quality_gate, QualityGate::Advisory);
        assert_eq!(c.execution_mode(), ExecutionMode::Sequential);
        assert_eq!(c.schedule, WeeklySchedule::new(Weekday::Mon, 9).unwrap());
    }

    #[test]
    fn overrides_are_parsed() {
        let c = config(&[("PIPELINE_CONCURRENT", "true"), ("QUALITY_GATE", "Enforce"), ("SCHEDULE_WEEKDAY", "friday"), ("DATA_DIR", " /var/vibe ")]).unwrap();
        assert_eq!(c.execution_mode(), ExecutionMode::Concurrent);
        assert_eq!(c.quality_gate, QualityGate::Enforce);
        assert_eq!(c.schedule.weekday(), Weekday::Fri);
        assert_eq!(c.data_dir, PathBuf::from("/var/vibe"));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        assert!(matches!(config(&[("STAGE_MAX_ATTEMPTS", "lots")]),
                         Err(ConfigError::InvalidVar { var: "STAGE_MAX_ATTEMPTS", .. })));
        assert!(matches!(config(&[("STAGE_MAX_ATTEMPTS", "0")]), Err(ConfigError::InvalidVar { .. })));
        assert!(matches!(config(&[("SCHEDULE_HOUR", "24")]), Err(ConfigError::InvalidVar { var: "SCHEDULE_HOUR", .. })));
        assert!(matches!(config(&[("QUALITY_GATE", "strict")]), Err(ConfigError::InvalidVar { var: "QUALITY_GATE", .. })));
    }

    #[test]
    fn out_of_range_deadline_is_rejected() {
        for minutes in ["0", "18446744073709551615", "-5"] {
            assert!(matches!(config(&[("RUN_DEADLINE_MINUTES", minutes)]),
                             Err(ConfigError::InvalidVar { var: "RUN_DEADLINE_MINUTES", .. })),
                    "{minutes}");
        }
        assert_eq!(config(&[("RUN_DEADLINE_MINUTES", "5")]).unwrap().run_deadline, Duration::from_secs(300));
    }

    #[test]
    fn out_of_range_lookback_is_rejected() {
        for hours in ["-24", "0", "9223372036854775807", "3000000000"] {
            assert!(matches!(config(&[("DEFAULT_LOOKBACK_HOURS", hours)]),
                             Err(ConfigError::InvalidVar { var: "DEFAULT_LOOKBACK_HOURS", .. })),
                    "{hours}");
        }
        assert_eq!(config(&[("DEFAULT_LOOKBACK_HOURS", "48")]).unwrap().default_lookback, TimeDelta::hours(48));
        assert_eq!(config(&[]).unwrap().default_lookback, TimeDelta::hours(24));
    }
}
