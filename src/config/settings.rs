//! Configuration settings for the life-force simulator

use crate::game_of_life::{DEFAULT_GRID_SIZE, DEFAULT_RULE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub rules: RuleConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub width: usize,
    pub height: usize,
    pub generations: usize,
    pub boundary_condition: BoundaryCondition,
    /// Starting pattern; a dead grid of `width` x `height` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state_file: Option<PathBuf>,
}

/// Edge policy for neighbor lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCondition {
    /// Cells beyond the edge do not exist
    Dead,
    /// Toroidal wrap-around
    Wrap,
    /// Edge rows and columns are reflected outward
    Mirror,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule string such as `B3/S23` or `B3/S23/A6`
    pub rule: String,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            rule: DEFAULT_RULE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub save_history: bool,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
    Visual,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                width: DEFAULT_GRID_SIZE,
                height: DEFAULT_GRID_SIZE,
                generations: 10,
                boundary_condition: BoundaryCondition::Dead,
                initial_state_file: None,
            },
            rules: RuleConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Text,
                save_history: false,
                output_directory: PathBuf::from("output/runs"),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings. The rule string is not checked here: malformed
    /// rules fall back to the defaults when the simulator is built.
    pub fn validate(&self) -> Result<()> {
        if self.simulation.width == 0 || self.simulation.height == 0 {
            anyhow::bail!(
                "Grid dimensions must be positive, got {}x{}",
                self.simulation.width, self.simulation.height
            );
        }

        if let Some(ref initial) = self.simulation.initial_state_file {
            if !initial.exists() {
                anyhow::bail!("Initial state file does not exist: {}", initial.display());
            }
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(ref rule) = cli_overrides.rule {
            self.rules.rule = rule.clone();
        }
        if let Some(width) = cli_overrides.width {
            self.simulation.width = width;
        }
        if let Some(height) = cli_overrides.height {
            self.simulation.height = height;
        }
        if let Some(generations) = cli_overrides.generations {
            self.simulation.generations = generations;
        }
        if let Some(ref boundary) = cli_overrides.boundary_condition {
            self.simulation.boundary_condition = boundary.clone();
        }
        if let Some(ref initial) = cli_overrides.initial_state_file {
            self.simulation.initial_state_file = Some(initial.clone());
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
            self.output.save_history = true;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub rule: Option<String>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub generations: Option<usize>,
    pub boundary_condition: Option<BoundaryCondition>,
    pub initial_state_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.simulation.width, 20);
        assert_eq!(settings.simulation.height, 20);
        assert_eq!(settings.rules.rule, "B3/S23/A6");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config/default.yaml");

        let mut settings = Settings::default();
        settings.rules.rule = "B36/S23/A8".to_string();
        settings.simulation.boundary_condition = BoundaryCondition::Wrap;
        settings.to_file(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.rules.rule, "B36/S23/A8");
        assert_eq!(loaded.simulation.boundary_condition, BoundaryCondition::Wrap);
        assert!(loaded.simulation.initial_state_file.is_none());
    }

    #[test]
    fn test_missing_rules_section_uses_default_rule() {
        let yaml = "\
simulation:
  width: 5
  height: 4
  generations: 3
  boundary_condition: mirror
output:
  format: json
  save_history: false
  output_directory: out
";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.rules.rule, DEFAULT_RULE);
        assert_eq!(settings.simulation.boundary_condition, BoundaryCondition::Mirror);
        assert!(matches!(settings.output.format, OutputFormat::Json));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.simulation.width = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.simulation.initial_state_file = Some(PathBuf::from("does/not/exist.txt"));
        assert!(settings.validate().is_err());

        // a malformed rule is not a configuration error
        let mut settings = Settings::default();
        settings.rules.rule = "nonsense".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_merge_with_cli() {
        let mut settings = Settings::default();
        let overrides = CliOverrides {
            rule: Some("B3/S23".to_string()),
            width: Some(8),
            generations: Some(42),
            output_dir: Some(PathBuf::from("runs")),
            ..Default::default()
        };
        settings.merge_with_cli(&overrides);

        assert_eq!(settings.rules.rule, "B3/S23");
        assert_eq!(settings.simulation.width, 8);
        assert_eq!(settings.simulation.height, 20);
        assert_eq!(settings.simulation.generations, 42);
        assert!(settings.output.save_history);
        assert_eq!(settings.output.output_directory, PathBuf::from("runs"));
    }
}
