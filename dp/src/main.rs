//! dp - definitions preprocessor CLI

use std::fs;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use defpp::cli::Cli;
use defpp::config::Config;
use defpp::{Preprocessor, to_yaml};

fn setup_logging(level: Option<&str>) -> Result<()> {
    let level = match level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize logging: {}", e))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.apply(Config::load(cli.config.as_ref()).context("Failed to load configuration")?);

    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;
    debug!(?config, "dp starting");

    let preprocessor = Preprocessor::new(&config);

    let resolution = preprocessor
        .resolve(&cli.in_file)
        .context(format!("Failed to resolve {}", cli.in_file.display()))?;

    if let Some(path) = &cli.processed_file
        && let Err(e) = fs::write(path, &resolution.text)
    {
        warn!("Failed to write processed file {}: {}", path.display(), e);
    }

    let expansion = preprocessor
        .expand(&resolution.text)
        .context("Failed to expand templates")?;
    info!(iterations = expansion.iterations, "Expansion complete");

    let output = to_yaml(&expansion.dictionary)?;
    match &cli.out_file {
        Some(path) => {
            fs::write(path, &output).context(format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote dictionary to {}", "✓".green(), path.display().to_string().cyan());
        }
        None => print!("{}", output),
    }

    Ok(())
}
