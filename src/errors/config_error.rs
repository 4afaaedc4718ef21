use std::path::PathBuf;

use thiserror::Error;

/// Errores de configuración: siempre fatales y anteriores a cualquier etapa.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Variable {var} inválida ({value:?}): {reason}")]
    InvalidVar { var: &'static str, value: String, reason: String },
    #[error("No se pudo leer {path}: {source}")]
    SourcesUnreadable { path: PathBuf, source: std::io::Error },
    #[error("Archivo de fuentes mal formado {path}: {reason}")]
    SourcesMalformed { path: PathBuf, reason: String },
    #[error("URL de feed inválida {url:?}: {reason}")]
    InvalidFeedUrl { url: String, reason: String },
    #[error("Sin feeds configurados en {0}")]
    NoSources(PathBuf),
    #[error("Topología inválida: {0}")]
    Topology(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_var_format() {
        let err = ConfigError::InvalidVar { var: "STAGE_MAX_ATTEMPTS",
                                            value: "many".into(),
                                            reason: "not a number".into() };
        assert_eq!(err.to_string(), "Variable STAGE_MAX_ATTEMPTS inválida (\"many\"): not a number");
    }

    #[test]
    fn no_sources_format() {
        let err = ConfigError::NoSources(PathBuf::from("config/sources.json"));
        assert_eq!(err.to_string(), "Sin feeds configurados en config/sources.json");
    }
}
