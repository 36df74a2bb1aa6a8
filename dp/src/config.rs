//! Configuration for defpp

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Config file looked for in the working directory
pub const LOCAL_CONFIG: &str = ".defpp.yml";

/// How the set of already-included files is shared during resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitedScope {
    /// One set for the whole include tree; every file is merged at most once
    #[default]
    Shared,
    /// Each branch works on a copy of its parent's set
    PerBranch,
}

/// Main defpp configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Sharing rule for the visited set
    pub visited_scope: VisitedScope,

    /// Treat a repeated include as an error instead of a warning
    pub strict_includes: bool,

    /// Fail rendering when a template references a missing field
    pub strict_templates: bool,

    /// Give up expanding after this many passes (unbounded when unset)
    pub max_iterations: Option<usize>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub log_level: Option<String>,
}

impl Config {
    /// Load the given config file, or the first usable candidate, or defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::from_file(path).context(format!("Failed to load config from {}", path.display()));
        }
        Ok(Self::discover(&Self::candidates()))
    }

    /// `.defpp.yml` in the working directory, then `<config dir>/defpp/defpp.yml`
    fn candidates() -> Vec<PathBuf> {
        [
            Some(PathBuf::from(LOCAL_CONFIG)),
            dirs::config_dir().map(|dir| dir.join("defpp").join("defpp.yml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// First candidate that exists and parses; broken files are skipped
    fn discover(candidates: &[PathBuf]) -> Self {
        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::from_file(path) {
                Ok(config) => return config,
                Err(e) => warn!("Skipping config {}: {:#}", path.display(), e),
            }
        }
        debug!("No config file found, using defaults");
        Self::default()
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content).context(format!("Invalid config {}", path.display()))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}
