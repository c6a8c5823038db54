//! Console output helpers

pub mod display;

pub use display::{HistoryFormatter, ProgressIndicator, ColorOutput, Color};
