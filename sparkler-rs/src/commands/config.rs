//! Configuration file command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use sparkler_sim::SparklerConfig;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the default configuration as JSON
    Show {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a JSON configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },
}

pub fn execute(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { output } => execute_show(output),
        ConfigCommands::Validate { file } => execute_validate(&file),
    }
}

/// Read a configuration file; fields it leaves out keep their defaults
pub fn load_config(path: &Path) -> Result<SparklerConfig> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let config: SparklerConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn execute_show(output: Option<PathBuf>) -> Result<()> {
    let config = SparklerConfig::default();
    match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &config)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            log::info!("Wrote default configuration to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }
    Ok(())
}

fn execute_validate(path: &Path) -> Result<()> {
    use console::style;

    let config = load_config(path)?;
    match config.validate() {
        Ok(()) => {
            println!("{} {}", style("✓").green().bold(), path.display());
            println!("  Columns:        {}", config.erosion.columns);
            println!("  Max progress:   {}", config.erosion.max_progress);
            println!("  Layers:         {:?}", config.emission.layers);
            println!("  Seed:           {}", config.seed);
            Ok(())
        }
        Err(e) => {
            println!("{} {}", style("✗").red().bold(), path.display());
            Err(e).with_context(|| format!("Invalid configuration: {}", path.display()))
        }
    }
}
