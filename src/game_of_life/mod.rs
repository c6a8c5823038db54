//! Life-force automaton core: grid, rules and evolution engine

pub mod grid;
pub mod rules;
pub mod simulator;
pub mod io;

pub use grid::{CellState, Grid, DEFAULT_GRID_SIZE};
pub use rules::{RuleError, RuleSet, DEFAULT_RULE, DEFAULT_STRENGTH};
pub use simulator::Simulator;
pub use io::{load_grid_from_file, save_grid_to_file, create_example_grids};
