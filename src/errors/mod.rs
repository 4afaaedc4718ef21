pub mod config_error;
pub mod run_error;

pub use config_error::ConfigError;
pub use run_error::RunError;
