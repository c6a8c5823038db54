//! Recorded simulation runs and their analysis

use crate::game_of_life::Grid;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every generation produced by a run, starting with the initial state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunHistory {
    /// Rule string in canonical form, e.g. `B3/S23/A6`
    pub rule: String,
    /// Generation counter of `states[0]`
    pub start_generation: u64,
    /// Grid states, one per generation
    pub states: Vec<Grid>,
    /// Wall-clock time spent stepping
    #[serde(skip)]
    pub run_time: Duration,
    pub metadata: HistoryMetadata,
}

/// Population figures and stability analysis of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMetadata {
    /// Identifier derived from the initial state and rule
    pub id: String,
    /// Living cells per recorded generation
    pub population: Vec<usize>,
    /// Total life-force per recorded generation
    pub life_force: Vec<u64>,
    pub peak_population: usize,
    pub peak_generation: u64,
    /// Density of living cells in the initial state (0.0 to 1.0)
    pub initial_density: f64,
    pub stability: StabilityAnalysis,
}

/// Long-run behaviour detected at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityAnalysis {
    /// No living cells remain
    pub is_extinct: bool,
    /// The last two states are identical and not extinct
    pub is_still_life: bool,
    /// The last state repeats an earlier one with period > 1
    pub is_oscillator: bool,
    pub oscillation_period: Option<usize>,
    /// The living cells drift between the last two states
    pub has_moving_patterns: bool,
    /// 1.0 for still lifes down to 0.0 for extinction
    pub stability_score: f64,
}

impl RunHistory {
    pub fn new(rule: String, start_generation: u64, states: Vec<Grid>, run_time: Duration) -> Self {
        let metadata = HistoryMetadata::analyze(&rule, start_generation, &states);
        Self {
            rule,
            start_generation,
            states,
            run_time,
            metadata,
        }
    }

    /// Number of steps recorded (one less than the number of states)
    pub fn generations(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn initial_state(&self) -> Option<&Grid> {
        self.states.first()
    }

    pub fn final_state(&self) -> Option<&Grid> {
        self.states.last()
    }

    /// State recorded at an absolute generation number
    pub fn state_at_generation(&self, generation: u64) -> Option<&Grid> {
        let offset = generation.checked_sub(self.start_generation)?;
        self.states.get(usize::try_from(offset).ok()?)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            id: self.metadata.id.clone(),
            rule: self.rule.clone(),
            generations: self.generations(),
            initial_population: self.metadata.population.first().copied().unwrap_or(0),
            final_population: self.metadata.population.last().copied().unwrap_or(0),
            peak_population: self.metadata.peak_population,
            run_time_ms: self.run_time.as_millis() as u64,
            is_extinct: self.metadata.stability.is_extinct,
            is_still_life: self.metadata.stability.is_still_life,
            is_oscillator: self.metadata.stability.is_oscillator,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let history = Self::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Malformed run history: {}", e))?;
        Ok(history)
    }
}

impl HistoryMetadata {
    pub fn analyze(rule: &str, start_generation: u64, states: &[Grid]) -> Self {
        let population: Vec<usize> = states.iter().map(Grid::living_count).collect();
        let life_force: Vec<u64> = states.iter().map(Grid::total_life_force).collect();

        // first maximum wins
        let (peak_index, peak_population) = population
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0), |best, (i, count)| if count > best.1 { (i, count) } else { best });

        let initial_density = states
            .first()
            .filter(|grid| !grid.cells.is_empty())
            .map(|grid| grid.living_count() as f64 / grid.cells.len() as f64)
            .unwrap_or(0.0);

        Self {
            id: Self::generate_id(rule, states.first()),
            population,
            life_force,
            peak_population,
            peak_generation: start_generation + peak_index as u64,
            initial_density,
            stability: StabilityAnalysis::analyze(states),
        }
    }

    fn generate_id(rule: &str, initial: Option<&Grid>) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        rule.hash(&mut hasher);
        if let Some(grid) = initial {
            grid.cells.hash(&mut hasher);
            grid.width.hash(&mut hasher);
            grid.height.hash(&mut hasher);
        }

        format!("run_{:x}", hasher.finish())
    }
}

impl StabilityAnalysis {
    pub fn analyze(states: &[Grid]) -> Self {
        let Some(last) = states.last() else {
            return Self::default();
        };

        let is_extinct = last.is_empty();
        let is_still_life = !is_extinct && Self::check_still_life(states);
        let oscillation_period = if is_extinct || is_still_life {
            None
        } else {
            Self::find_period(states)
        };
        let is_oscillator = oscillation_period.is_some();
        let has_moving_patterns = !is_extinct && Self::check_moving_patterns(states);

        Self {
            is_extinct,
            is_still_life,
            is_oscillator,
            oscillation_period,
            has_moving_patterns,
            stability_score: Self::calculate_stability_score(
                is_extinct,
                is_still_life,
                is_oscillator,
                has_moving_patterns,
            ),
        }
    }

    fn check_still_life(states: &[Grid]) -> bool {
        match states {
            [.., previous, last] => previous == last,
            _ => false,
        }
    }

    /// Smallest period p > 1 such that the last state equals the state p
    /// generations earlier
    fn find_period(states: &[Grid]) -> Option<usize> {
        let last_index = states.len().checked_sub(1)?;
        let last = &states[last_index];
        (2..=last_index).find(|&period| &states[last_index - period] == last)
    }

    fn check_moving_patterns(states: &[Grid]) -> bool {
        let [.., previous, last] = states else {
            return false;
        };

        let prev_cells = previous.living_cells();
        let curr_cells = last.living_cells();
        if prev_cells.is_empty() || prev_cells.len() != curr_cells.len() {
            return false;
        }

        let prev_center = Self::calculate_center_of_mass(&prev_cells);
        let curr_center = Self::calculate_center_of_mass(&curr_cells);
        let distance = ((prev_center.0 - curr_center.0).powi(2)
            + (prev_center.1 - curr_center.1).powi(2))
        .sqrt();

        distance > 0.5
    }

    fn calculate_center_of_mass(cells: &[(usize, usize)]) -> (f64, f64) {
        if cells.is_empty() {
            return (0.0, 0.0);
        }

        let sum_x: usize = cells.iter().map(|(x, _)| x).sum();
        let sum_y: usize = cells.iter().map(|(_, y)| y).sum();

        (sum_x as f64 / cells.len() as f64, sum_y as f64 / cells.len() as f64)
    }

    fn calculate_stability_score(
        is_extinct: bool,
        is_still_life: bool,
        is_oscillator: bool,
        has_moving_patterns: bool,
    ) -> f64 {
        if is_extinct {
            0.0
        } else if is_still_life {
            1.0
        } else if is_oscillator {
            0.8
        } else if has_moving_patterns {
            0.3
        } else {
            0.5
        }
    }

    /// Short label for tables
    pub fn label(&self) -> &'static str {
        if self.is_extinct {
            "Extinct"
        } else if self.is_still_life {
            "Still"
        } else if self.is_oscillator {
            "Osc"
        } else if self.has_moving_patterns {
            "Moving"
        } else {
            "Active"
        }
    }
}

/// Summary of a run for display and JSON indexes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: String,
    pub rule: String,
    pub generations: usize,
    pub initial_population: usize,
    pub final_population: usize,
    pub peak_population: usize,
    pub run_time_ms: u64,
    pub is_extinct: bool,
    pub is_still_life: bool,
    pub is_oscillator: bool,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Run {} [{}]: {} generations, population {} -> {} (peak {}), {}ms",
               self.id,
               self.rule,
               self.generations,
               self.initial_population,
               self.final_population,
               self.peak_population,
               self.run_time_ms)
    }
}
