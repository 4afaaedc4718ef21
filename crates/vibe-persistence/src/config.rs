//! Carga del archivo `.env`, compartida por todos los binarios.

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Fuerza la carga de `.env` antes de leer variables de entorno.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
