//! CLI argument parsing for defpp

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "dp")]
#[command(author, version, about = "Merge !include'd definitions and expand templates", long_about = None)]
pub struct Cli {
    /// Definitions YAML file
    #[arg(short = 'f', long = "in-file", visible_alias = "inFile")]
    pub in_file: PathBuf,

    /// Dictionary YAML file (default: stdout)
    #[arg(short = 'o', long = "out-file", visible_alias = "outFile")]
    pub out_file: Option<PathBuf>,

    /// Write the merged input, before template expansion, to this file
    #[arg(short = 'p', long = "processed-file", visible_alias = "pFile")]
    pub processed_file: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Stop with an error after this many expansion passes
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Fail when a file is included more than once
    #[arg(long)]
    pub strict_includes: bool,

    /// Fail when a template references a missing field
    #[arg(long)]
    pub strict_templates: bool,
}

impl Cli {
    /// Overlay command-line flags on a loaded config
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(max) = self.max_iterations {
            config.max_iterations = Some(max);
        }
        if self.strict_includes {
            config.strict_includes = true;
        }
        if self.strict_templates {
            config.strict_templates = true;
        }
        if self.log_level.is_some() {
            config.log_level = self.log_level.clone();
        }
        config
    }
}
