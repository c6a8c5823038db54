//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::game_of_life::{CellState, Grid, RuleSet};
use crate::simulation::RunHistory;
use anyhow::{Context, Result};
use std::path::Path;

/// Shading from weakest to full life-force
const SHADES: [char; 4] = ['░', '▒', '▓', '█'];
const DEAD: char = '·';

/// Format run histories for display
pub struct HistoryFormatter;

impl HistoryFormatter {
    /// Format a single run for console output
    pub fn format_history(history: &RunHistory, show_evolution: bool) -> String {
        let strength = Self::strength_of(history);
        let stability = &history.metadata.stability;
        let mut output = String::new();

        output.push_str(&format!("=== Run {} ===\n", history.metadata.id));
        output.push_str(&format!("Rule: {}\n", history.rule));
        output.push_str(&format!("Generations: {}\n", history.generations()));
        output.push_str(&format!("Run Time: {:.3}s\n", history.run_time.as_secs_f64()));
        output.push_str(&format!("Population: {} → {} (peak {} at generation {})\n",
                                history.metadata.population.first().copied().unwrap_or(0),
                                history.metadata.population.last().copied().unwrap_or(0),
                                history.metadata.peak_population,
                                history.metadata.peak_generation));

        match stability.oscillation_period {
            Some(period) if stability.is_oscillator => {
                output.push_str(&format!("Type: Oscillator (period {})\n", period));
            }
            _ => output.push_str(&format!("Type: {}\n", stability.label())),
        }
        output.push('\n');

        if show_evolution {
            output.push_str("Evolution:\n");
            for (i, grid) in history.states.iter().enumerate() {
                output.push_str(&format!("Generation {}:\n", history.start_generation + i as u64));
                output.push_str(&Self::format_grid_compact(grid, strength));
                output.push('\n');
            }
        } else if let (Some(first), Some(last)) = (history.initial_state(), history.final_state()) {
            output.push_str("Initial State:\n");
            output.push_str(&Self::format_grid_compact(first, strength));
            output.push('\n');
            output.push_str(&format!("Final State (after {} generations):\n", history.generations()));
            output.push_str(&Self::format_grid_compact(last, strength));
        }

        output
    }

    /// Per-generation population and life-force table
    pub fn format_population_table(history: &RunHistory) -> String {
        let mut output = String::new();

        output.push_str("Generation | Living | Life-force\n");
        output.push_str("-----------|--------|-----------\n");

        let rows = history.metadata.population.iter().zip(&history.metadata.life_force);
        for (i, (living, force)) in rows.enumerate() {
            output.push_str(&format!(
                "{:10} | {:6} | {:10}\n",
                history.start_generation + i as u64,
                living,
                force
            ));
        }

        output
    }

    /// Format multiple runs as a summary table
    pub fn format_history_summary(histories: &[RunHistory]) -> String {
        let mut output = String::new();

        output.push_str("Runs Summary:\n");
        output.push_str("ID       | Rule        | Gens | Living  | Type\n");
        output.push_str("---------|-------------|------|---------|--------\n");

        for history in histories {
            let summary = history.summary();
            output.push_str(&format!(
                "{:8} | {:11} | {:4} | {:7} | {}\n",
                &summary.id[..8.min(summary.id.len())],
                summary.rule,
                summary.generations,
                format!("{}→{}", summary.initial_population, summary.final_population),
                history.metadata.stability.label()
            ));
        }

        output
    }

    /// Format a grid with one shaded character per cell
    pub fn format_grid_compact(grid: &Grid, strength: CellState) -> String {
        let mut output = String::new();
        for y in 0..grid.height {
            for x in 0..grid.width {
                output.push(Self::shade(grid.get(x, y), strength));
            }
            output.push('\n');
        }
        output
    }

    /// Format a grid with coordinates and raw life-force values
    pub fn format_grid_with_coords(grid: &Grid) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for x in 0..grid.width {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        for y in 0..grid.height {
            output.push_str(&format!("{:2} ", y));
            for x in 0..grid.width {
                let symbol = match grid.get(x, y) {
                    0 => DEAD,
                    state => char::from_digit(state as u32, 36).unwrap_or('+'),
                };
                output.push(' ');
                output.push(symbol);
            }
            output.push('\n');
        }

        output
    }

    /// Map a life-force onto a shade relative to the rule's strength
    fn shade(state: CellState, strength: CellState) -> char {
        if state == 0 {
            return DEAD;
        }
        let strength = strength.max(1) as usize;
        let level = (state as usize * SHADES.len()).div_ceil(strength);
        SHADES[level.clamp(1, SHADES.len()) - 1]
    }

    fn strength_of(history: &RunHistory) -> CellState {
        history
            .rule
            .parse::<RuleSet>()
            .map(|rules| rules.strength)
            .unwrap_or_else(|_| history.states.iter().map(Grid::max_state).max().unwrap_or(1))
    }

    /// Save a run to the output directory in the requested format
    pub fn save_history<P: AsRef<Path>>(
        history: &RunHistory,
        output_dir: P,
        format: &OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        match format {
            OutputFormat::Text => {
                let filepath = output_dir.join(format!("{}.txt", history.metadata.id));
                std::fs::write(&filepath, Self::format_history(history, true))
                    .with_context(|| format!("Failed to write {}", filepath.display()))?;
            }
            OutputFormat::Json => {
                let filepath = output_dir.join(format!("{}.json", history.metadata.id));
                history.save_to_file(&filepath)
                    .with_context(|| format!("Failed to write {}", filepath.display()))?;

                let summary_path = output_dir.join("run_summary.json");
                let summary_json = serde_json::to_string_pretty(&history.summary())?;
                std::fs::write(&summary_path, summary_json)
                    .with_context(|| format!("Failed to write {}", summary_path.display()))?;
            }
            OutputFormat::Visual => {
                let filepath = output_dir.join(format!("{}_visual.txt", history.metadata.id));
                std::fs::write(&filepath, Self::create_visual_evolution(history))
                    .with_context(|| format!("Failed to write {}", filepath.display()))?;
            }
        }

        Ok(())
    }

    fn create_visual_evolution(history: &RunHistory) -> String {
        let mut output = String::new();

        output.push_str(&format!("Visual Evolution - Run {} [{}]\n", history.metadata.id, history.rule));
        output.push_str(&"=".repeat(50));
        output.push('\n');

        for (i, grid) in history.states.iter().enumerate() {
            output.push_str(&format!("\nGeneration {} (Living: {}):\n",
                                     history.start_generation + i as u64,
                                     grid.living_count()));
            output.push_str(&Self::format_grid_with_coords(grid));
        }

        output.push_str("\nRun Statistics:\n");
        output.push_str(&Self::format_population_table(history));
        output.push_str(&format!("Stability Score: {:.2}\n", history.metadata.stability.stability_score));

        output
    }
}

/// Progress indicator for long-running operations
pub struct ProgressIndicator {
    total: usize,
    current: usize,
    last_update: std::time::Instant,
    start_time: std::time::Instant,
}

impl ProgressIndicator {
    pub fn new(total: usize) -> Self {
        let now = std::time::Instant::now();
        Self {
            total,
            current: 0,
            last_update: now,
            start_time: now,
        }
    }

    /// Update progress, redrawing at most every 100ms
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);
        let now = std::time::Instant::now();

        if now.duration_since(self.last_update).as_millis() > 100 {
            self.display();
            self.last_update = now;
        }
    }

    pub fn display(&self) {
        let percentage = if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        };

        let elapsed = self.start_time.elapsed();
        let eta = if self.current > 0 {
            let rate = self.current as f64 / elapsed.as_secs_f64();
            let remaining = (self.total - self.current) as f64 / rate;
            format!("ETA: {:.1}s", remaining)
        } else {
            "ETA: --".to_string()
        };

        print!("\rGeneration {}/{} ({:.1}%) - {}",
               self.current, self.total, percentage, eta);
        std::io::Write::flush(&mut std::io::stdout()).ok();
    }

    /// Finish and clear the progress line
    pub fn finish(&self) {
        println!("\rCompleted: {}/{} (100.0%) - Total time: {:.1}s",
                self.total, self.total, self.start_time.elapsed().as_secs_f64());
    }
}

/// ANSI colored console messages; plain text under `NO_COLOR` or `TERM=dumb`
pub struct ColorOutput;

impl ColorOutput {
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var_os("NO_COLOR").is_none()
            && std::env::var("TERM").map_or(true, |term| term != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryCondition;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_history() -> RunHistory {
        let first = Grid::from_rows(
            vec![vec![0, 6, 0], vec![3, 0, 1], vec![0, 12, 0]],
            BoundaryCondition::Dead,
        ).unwrap();
        let second = Grid::from_rows(
            vec![vec![0, 5, 0], vec![2, 0, 0], vec![0, 11, 0]],
            BoundaryCondition::Dead,
        ).unwrap();
        RunHistory::new("B3/S23/A6".to_string(), 0, vec![first, second], Duration::ZERO)
    }

    #[test]
    fn test_shading_scales_with_strength() {
        assert_eq!(HistoryFormatter::shade(0, 6), '·');
        assert_eq!(HistoryFormatter::shade(1, 6), '░');
        assert_eq!(HistoryFormatter::shade(3, 6), '▒');
        assert_eq!(HistoryFormatter::shade(6, 6), '█');
        assert_eq!(HistoryFormatter::shade(1, 1), '█');
        // values above strength still render
        assert_eq!(HistoryFormatter::shade(9, 6), '█');
    }

    #[test]
    fn test_grid_formatting() {
        let history = sample_history();
        let grid = history.initial_state().unwrap();

        let compact = HistoryFormatter::format_grid_compact(grid, 6);
        assert_eq!(compact.lines().count(), 3);
        assert!(compact.contains('█'));
        assert!(compact.contains('·'));

        let with_coords = HistoryFormatter::format_grid_with_coords(grid);
        assert!(with_coords.contains(" 0 1 2"));
        assert!(with_coords.contains(" 3"));
        assert!(with_coords.contains(" c"));
    }

    #[test]
    fn test_history_formatting() {
        let history = sample_history();
        let text = HistoryFormatter::format_history(&history, true);
        assert!(text.contains("Rule: B3/S23/A6"));
        assert!(text.contains("Generation 1:"));

        let table = HistoryFormatter::format_population_table(&history);
        assert!(table.contains("Life-force"));
        assert_eq!(table.lines().count(), 4);

        let summary = HistoryFormatter::format_history_summary(&[history]);
        assert!(summary.contains("B3/S23/A6"));
    }

    #[test]
    fn test_save_history_in_every_format() {
        let temp_dir = tempdir().unwrap();
        let history = sample_history();
        let id = history.metadata.id.clone();

        for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Visual] {
            HistoryFormatter::save_history(&history, temp_dir.path(), &format).unwrap();
        }

        assert!(temp_dir.path().join(format!("{}.txt", id)).exists());
        assert!(temp_dir.path().join(format!("{}_visual.txt", id)).exists());
        assert!(temp_dir.path().join("run_summary.json").exists());

        let loaded = RunHistory::load_from_file(temp_dir.path().join(format!("{}.json", id))).unwrap();
        assert_eq!(loaded.states, history.states);
    }

    #[test]
    fn test_progress_indicator() {
        let mut progress = ProgressIndicator::new(100);
        progress.update(50);
        assert_eq!(progress.current, 50);
        progress.update(500);
        assert_eq!(progress.current, 100);
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
        assert!(ColorOutput::success("OK").contains("OK"));
    }
}
