//! Orquestación del run semanal.

pub mod manager;
pub mod stores;

pub use manager::{RunOptions, WeeklyRunManager};
pub use stores::RunStores;
