//! Settings-driven simulation runs

use crate::config::Settings;
use crate::game_of_life::{load_grid_from_file, Grid, RuleSet, Simulator};
use super::RunHistory;
use crate::utils::ColorOutput;
use anyhow::{Context, Result};
use std::time::Instant;

/// A simulator configured from [`Settings`]
pub struct SimulationRun {
    settings: Settings,
    simulator: Simulator,
}

impl SimulationRun {
    /// Build a run from settings, loading the initial state file if one is
    /// configured and otherwise starting from a dead grid
    pub fn new(settings: Settings) -> Result<Self> {
        let grid = match settings.simulation.initial_state_file {
            Some(ref path) => load_grid_from_file(path, settings.simulation.boundary_condition.clone())
                .context("Failed to load initial state file")?,
            None => Grid::new(
                settings.simulation.width,
                settings.simulation.height,
                settings.simulation.boundary_condition.clone(),
            ),
        };

        Ok(Self::with_initial_grid(settings, grid))
    }

    /// Build a run with an explicit starting grid (useful for testing).
    /// Cells stronger than the rule allows are lowered to its strength.
    pub fn with_initial_grid(settings: Settings, mut grid: Grid) -> Self {
        let rules = RuleSet::parse(&settings.rules.rule);
        let clamped = grid.clamp_states(rules.strength);
        if clamped > 0 {
            let message = format!(
                "Warning: {} cell(s) exceed the strength of {}, clamped to {}",
                clamped, rules, rules.strength
            );
            eprintln!("{}", ColorOutput::warning(&message));
        }
        Self {
            settings,
            simulator: Simulator::new(grid, rules),
        }
    }

    /// Step through the configured number of generations and record every state
    pub fn run(&mut self) -> RunHistory {
        self.run_with(|_, _| {})
    }

    /// Like [`run`](Self::run), calling `observer` with each new generation
    pub fn run_with<F>(&mut self, mut observer: F) -> RunHistory
    where
        F: FnMut(u64, &Grid),
    {
        let start_generation = self.simulator.generation();
        let generations = self.settings.simulation.generations;
        let mut states = Vec::with_capacity(generations + 1);
        states.push(self.simulator.grid().clone());

        let start_time = Instant::now();
        for _ in 0..generations {
            let grid = self.simulator.step();
            states.push(grid.clone());
            observer(self.simulator.generation(), self.simulator.grid());
        }

        RunHistory::new(
            self.simulator.rules().to_string(),
            start_generation,
            states,
            start_time.elapsed(),
        )
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryCondition;
    use crate::game_of_life::save_grid_to_file;
    use tempfile::tempdir;

    #[test]
    fn test_run_records_every_generation() {
        let mut settings = Settings::default();
        settings.simulation.generations = 4;
        settings.rules.rule = "B3/S23".to_string();

        let grid = Grid::from_rows(
            vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 0, 0]],
            BoundaryCondition::Dead,
        ).unwrap();
        let mut run = SimulationRun::with_initial_grid(settings, grid);

        let mut seen = Vec::new();
        let history = run.run_with(|generation, grid| seen.push((generation, grid.living_count())));

        assert_eq!(history.states.len(), 5);
        assert_eq!(history.rule, "B3/S23");
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3), (4, 3)]);
        assert_eq!(run.simulator().generation(), 4);
        assert_eq!(history.metadata.stability.oscillation_period, Some(2));
    }

    #[test]
    fn test_new_uses_configured_dimensions() {
        let mut settings = Settings::default();
        settings.simulation.width = 7;
        settings.simulation.height = 3;
        settings.simulation.boundary_condition = BoundaryCondition::Wrap;

        let run = SimulationRun::new(settings).unwrap();
        let grid = run.simulator().grid();
        assert_eq!((grid.width, grid.height), (7, 3));
        assert_eq!(grid.boundary_condition, BoundaryCondition::Wrap);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_new_loads_initial_state_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("start.txt");
        let mut start = Grid::square(4);
        start.set(1, 2, 6).unwrap();
        save_grid_to_file(&start, &path).unwrap();

        let mut settings = Settings::default();
        settings.simulation.initial_state_file = Some(path);
        let run = SimulationRun::new(settings).unwrap();
        assert_eq!(run.simulator().grid(), &start);
    }

    #[test]
    fn test_malformed_rule_runs_with_default_rules() {
        let mut settings = Settings::default();
        settings.rules.rule = "not a rule".to_string();
        settings.simulation.generations = 1;

        let mut run = SimulationRun::new(settings).unwrap();
        let history = run.run();
        assert_eq!(history.rule, "B3/S23/A6");
    }

    #[test]
    fn test_pattern_stronger_than_rule_is_clamped() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("strong.txt");
        std::fs::write(&path, "000\n5z2\n000\n").unwrap();

        let mut settings = Settings::default();
        settings.rules.rule = "B3/S23".to_string();
        settings.simulation.initial_state_file = Some(path);
        settings.simulation.generations = 1;

        let mut run = SimulationRun::new(settings).unwrap();
        assert_eq!(run.simulator().grid().cells, vec![0, 0, 0, 1, 1, 1, 0, 0, 0]);

        // a binary blinker from here on
        let history = run.run();
        assert_eq!(history.states[1].cells, vec![0, 1, 0, 0, 1, 0, 0, 1, 0]);
        assert!(history.states.iter().all(|g| g.max_state() <= 1));
    }

    #[test]
    fn test_pattern_within_strength_is_unchanged() {
        let grid = Grid::from_rows(vec![vec![6, 4, 0]], BoundaryCondition::Dead).unwrap();
        let run = SimulationRun::with_initial_grid(Settings::default(), grid.clone());
        assert_eq!(run.simulator().grid(), &grid);
    }
}
