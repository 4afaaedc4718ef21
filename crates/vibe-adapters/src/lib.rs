//! vibe-adapters: etapas concretas de la topología semanal y colaboradores
//! offline.
//!
//! - `stages`: las ocho etapas (síntesis, guion, newsletter, audio, imagen,
//!   dos posts sociales, curación de comunidad) y `weekly_topology`, que las
//!   ensambla en orden de prioridad.
//! - `offline`: colaboradores locales y deterministas que escriben a disco en
//!   lugar de llamar APIs remotas, para correr un run completo sin
//!   credenciales.

pub mod offline;
pub mod stages;

pub use stages::weekly_topology;
