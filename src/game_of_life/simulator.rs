//! Evolution engine: applies a [`RuleSet`] to every cell once per generation

use super::grid::{CellState, Grid};
use super::rules::RuleSet;

/// Turn-based simulator over a single active grid.
///
/// Two buffers are kept: each step reads only from the active grid and writes
/// every cell of the scratch grid, then the two are swapped. The previous
/// generation is overwritten by the following step; no history is kept here.
#[derive(Debug, Clone)]
pub struct Simulator {
    grid: Grid,
    scratch: Grid,
    generation: u64,
    rules: RuleSet,
}

impl Simulator {
    pub fn new(grid: Grid, rules: RuleSet) -> Self {
        let scratch = grid.clone();
        Self {
            grid,
            scratch,
            generation: 0,
            rules,
        }
    }

    /// Build a simulator from a rule string; malformed strings fall back to
    /// the default rules
    pub fn with_rule_string(grid: Grid, rule: &str) -> Self {
        Self::new(grid, RuleSet::parse(rule))
    }

    /// Advance one generation and return the new active grid
    pub fn step(&mut self) -> &Grid {
        self.generation += 1;

        let Self { grid, scratch, rules, .. } = self;
        if !scratch.same_shape(grid) {
            *scratch = grid.clone();
        }

        for y in 0..grid.height {
            for x in 0..grid.width {
                let idx = grid.index(x, y);
                scratch.cells[idx] = rules.next_state(grid.cells[idx], grid.neighbors(x, y));
            }
        }

        std::mem::swap(grid, scratch);
        &self.grid
    }

    /// Advance `generations` steps and return the active grid
    pub fn step_n(&mut self, generations: usize) -> &Grid {
        for _ in 0..generations {
            self.step();
        }
        &self.grid
    }

    /// Whether a neighbor with this life-force counts toward a birth
    pub fn fertility_check(&self, value: CellState) -> bool {
        self.rules.is_fertile(value)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access for seeding cells between steps
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Replace the active grid. The generation counter is left untouched.
    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Default for Simulator {
    /// 20x20 dead grid under the default weighted rules
    fn default() -> Self {
        Self::new(Grid::default(), RuleSet::default())
    }
}
