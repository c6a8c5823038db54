//! Configured simulation runs, their recorded history and validation

pub mod history;
pub mod runner;
pub mod validator;

pub use history::{RunHistory, RunSummary, StabilityAnalysis};
pub use runner::SimulationRun;
pub use validator::HistoryValidator;
