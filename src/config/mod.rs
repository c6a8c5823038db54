//! Configuration management for the life-force simulator

pub mod settings;

pub use settings::{
    Settings, SimulationConfig, RuleConfig, OutputConfig, BoundaryCondition, OutputFormat,
    CliOverrides
};
