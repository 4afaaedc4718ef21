//! Constantes del motor de etapas.
//!
//! `ENGINE_VERSION` forma parte del input de los fingerprints de etapa y de
//! run: cambiarla invalida determinísticamente los fingerprints aunque la
//! topología y los datos no cambien.

/// Versión lógica del motor. Mantener estable mientras no haya cambios
/// incompatibles en el orden de ejecución o en el formato de artifacts.
pub const ENGINE_VERSION: &str = "W1.0";

/// Máximo de posts destacados que recibe el paso de engagement de comunidad.
pub const FEATURED_POSTS_LIMIT: usize = 2;

/// Titulares de apoyo que se citan en un post social.
pub const SOCIAL_HEADLINES_LIMIT: usize = 3;

/// Guiones archivados que se releen como contexto histórico de la síntesis.
pub const HISTORY_TRANSCRIPTS_LIMIT: usize = 4;
