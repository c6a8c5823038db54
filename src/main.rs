//! Command line front end for the life-force simulator

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use life_force::{
    config::{BoundaryCondition, CliOverrides, Settings},
    game_of_life::{create_example_grids, load_grid_from_file, RuleSet},
    simulation::{HistoryValidator, RunHistory, SimulationRun},
    utils::{ColorOutput, HistoryFormatter, ProgressIndicator},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "life_force")]
#[command(about = "Life-force cellular automaton simulator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Rule string such as B3/S23 or B3/S23/A6 (overrides config)
        rule: Option<String>,

        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Grid width (overrides config)
        #[arg(long)]
        width: Option<usize>,

        /// Grid height (overrides config)
        #[arg(long)]
        height: Option<usize>,

        /// Number of generations (overrides config)
        #[arg(short, long)]
        generations: Option<usize>,

        /// Edge policy (overrides config)
        #[arg(short, long, value_enum)]
        boundary: Option<BoundaryCondition>,

        /// Initial state file (overrides config)
        #[arg(short, long)]
        initial: Option<PathBuf>,

        /// Save the run history to this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print every generation
        #[arg(long)]
        show_evolution: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Create example configuration and pattern files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Check that a saved JSON history follows its rule
    Validate {
        /// History file written with the json output format
        #[arg(long)]
        history: PathBuf,

        /// Validate against this rule instead of the recorded one
        #[arg(short, long)]
        rule: Option<String>,
    },

    /// Print statistics for a pattern and how it settles
    Analyze {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Pattern file
        #[arg(short, long)]
        pattern: PathBuf,

        /// Rule string (overrides config)
        #[arg(short, long)]
        rule: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            rule, config, width, height, generations, boundary, initial, output,
            show_evolution, verbose
        } => {
            let overrides = CliOverrides {
                rule,
                width,
                height,
                generations,
                boundary_condition: boundary,
                initial_state_file: initial,
                output_dir: output,
            };
            run_command(config, overrides, show_evolution, verbose)
        }
        Commands::Setup { directory, force } => {
            setup_command(directory, force)
        }
        Commands::Validate { history, rule } => {
            validate_command(history, rule)
        }
        Commands::Analyze { config, pattern, rule } => {
            analyze_command(config, pattern, rule)
        }
    }
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        let message = format!("Config file {} not found, using defaults", config_path.display());
        println!("{}", ColorOutput::warning(&message));
        Ok(Settings::default())
    }
}

fn run_command(
    config_path: PathBuf,
    overrides: CliOverrides,
    show_evolution: bool,
    verbose: bool,
) -> Result<()> {
    println!("{}", ColorOutput::info("🌱 Starting life-force simulation"));

    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides);
    settings.validate()
        .context("Configuration validation failed")?;

    let mut run = SimulationRun::new(settings.clone())
        .context("Failed to set up simulation")?;

    if verbose {
        let rules = run.simulator().rules();
        println!("Configuration:");
        println!("  Rule: {}", rules);
        println!("  Mode: {}", if rules.is_binary() { "binary" } else { "weighted" });
        println!("  Grid: {}x{} ({:?} edges)",
                 run.simulator().grid().width,
                 run.simulator().grid().height,
                 settings.simulation.boundary_condition);
        println!("  Generations: {}", settings.simulation.generations);
        println!();
    }

    let mut progress = ProgressIndicator::new(settings.simulation.generations);
    let history = run.run_with(|generation, _| {
        if verbose {
            progress.update(generation as usize);
        }
    });
    if verbose {
        progress.finish();
    }

    let message = format!(
        "✅ Simulated {} generation(s) in {:.3}s",
        history.generations(),
        history.run_time.as_secs_f64()
    );
    println!("{}", ColorOutput::success(&message));
    println!("\n{}", HistoryFormatter::format_history(&history, show_evolution));

    if verbose {
        println!("{}", HistoryFormatter::format_population_table(&history));
    }

    if settings.output.save_history {
        HistoryFormatter::save_history(&history, &settings.output.output_directory, &settings.output.format)
            .context("Failed to save run history")?;
        let message = format!("History saved to {}", settings.output.output_directory.display());
        println!("{}", ColorOutput::success(&message));
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("🛠️  Setting up project structure..."));

    let config_dir = directory.join("config");
    let patterns_dir = directory.join("input/patterns");
    let output_dir = directory.join("output/runs");

    for dir in [&config_dir, &patterns_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default().to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_grids(&patterns_dir)
        .context("Failed to create example patterns")?;
    println!("Created example patterns in: {}", patterns_dir.display());

    let variants_dir = config_dir.join("examples");
    std::fs::create_dir_all(&variants_dir)?;

    let mut conway = Settings::default();
    conway.rules.rule = "B3/S23".to_string();
    conway.simulation.generations = 8;
    conway.simulation.boundary_condition = BoundaryCondition::Wrap;
    conway.simulation.initial_state_file = Some(PathBuf::from("input/patterns/glider.txt"));
    conway.to_file(&variants_dir.join("conway.yaml"))?;

    let mut weighted = Settings::default();
    weighted.simulation.generations = 12;
    weighted.simulation.initial_state_file = Some(PathBuf::from("input/patterns/mixed_colony.txt"));
    weighted.output.save_history = true;
    weighted.to_file(&variants_dir.join("weighted.yaml"))?;

    println!("Created example configurations in: {}", variants_dir.display());

    println!("\n{}", ColorOutput::success("✅ Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your own patterns to {}", patterns_dir.display());
    println!("3. Run: life_force run --config config/examples/weighted.yaml");

    Ok(())
}

fn validate_command(history_path: PathBuf, rule: Option<String>) -> Result<()> {
    println!("{}", ColorOutput::info("🔍 Validating run history..."));

    let history = RunHistory::load_from_file(&history_path)
        .with_context(|| format!("Failed to load history from {}", history_path.display()))?;

    let validator = match rule {
        Some(ref rule) => HistoryValidator::new(RuleSet::parse(rule)),
        None => HistoryValidator::for_history(&history),
    };
    let result = validator.validate(&history);

    println!("{}", result);

    if !result.is_valid {
        println!("{}", ColorOutput::error("❌ History does not follow the rule"));
        let reason = result.error_message.as_deref().unwrap_or("rule violations");
        anyhow::bail!("{} is invalid: {}", history_path.display(), reason);
    }

    println!("{}", ColorOutput::success("✅ History is consistent with the rule"));
    Ok(())
}

fn analyze_command(config_path: PathBuf, pattern_path: PathBuf, rule: Option<String>) -> Result<()> {
    println!("{}", ColorOutput::info("🔬 Analyzing pattern..."));

    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&CliOverrides { rule, ..Default::default() });

    let pattern = load_grid_from_file(&pattern_path, settings.simulation.boundary_condition.clone())
        .with_context(|| format!("Failed to load pattern from {}", pattern_path.display()))?;

    println!("Pattern ({}x{}):", pattern.width, pattern.height);
    println!("{}", HistoryFormatter::format_grid_with_coords(&pattern));

    let total_cells = pattern.width * pattern.height;
    println!("Grid Statistics:");
    println!("  Living cells: {}", pattern.living_count());
    println!("  Density: {:.1}%", (pattern.living_count() as f64 / total_cells as f64) * 100.0);
    println!("  Total life-force: {}", pattern.total_life_force());
    println!("  Strongest cell: {}", pattern.max_state());

    let mut run = SimulationRun::with_initial_grid(settings, pattern);
    let rules = run.simulator().rules().clone();
    let fertile = run.simulator().grid().cells.iter().filter(|&&cell| rules.is_fertile(cell)).count();
    println!("  Fertile cells under {}: {}", rules, fertile);

    let history = run.run();
    let stability = &history.metadata.stability;
    println!("\nAfter {} generations:", history.generations());
    println!("  Population: {}", history.metadata.population.last().copied().unwrap_or(0));
    println!("  Peak: {} at generation {}", history.metadata.peak_population, history.metadata.peak_generation);
    match stability.oscillation_period {
        Some(period) => println!("  Behaviour: oscillator with period {}", period),
        None => println!("  Behaviour: {}", stability.label()),
    }
    println!("  Stability score: {:.2}", stability.stability_score);

    Ok(())
}
