//! Life-force cellular automaton
//!
//! A generalisation of Conway's Game of Life where living cells carry a
//! life-force that weakens instead of dying outright, and births require
//! enough mature ("fertile") neighbors. Binary Life is the special case of a
//! rule with strength 1.

pub mod config;
pub mod game_of_life;
pub mod simulation;
pub mod utils;

pub use config::Settings;
pub use game_of_life::{Grid, RuleSet, Simulator};
pub use simulation::{RunHistory, SimulationRun};

use anyhow::Result;

/// Main entry point: build a run from settings and record its history
pub fn run_simulation(settings: Settings) -> Result<RunHistory> {
    let mut run = SimulationRun::new(settings)?;
    Ok(run.run())
}
