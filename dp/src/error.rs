//! Error types for definitions preprocessing

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving or expanding definitions
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse definitions: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Definitions must be a mapping, found {found}")]
    NotAMapping { found: &'static str },

    #[error("Template failed to compile: {0}")]
    TemplateCompile(#[from] handlebars::TemplateError),

    #[error("Template failed to render: {0}")]
    TemplateRender(#[from] handlebars::RenderError),

    #[error("File included twice: {path} (from {included_from})")]
    DuplicateInclude { path: PathBuf, included_from: PathBuf },

    #[error("Templates did not converge after {iterations} iterations")]
    DidNotConverge { iterations: usize },

    #[error("Failed to serialize dictionary: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

impl Error {
    /// Check if this error came from reading an input file
    pub fn is_read(&self) -> bool {
        matches!(self, Error::Read { .. })
    }

    /// Check if this error came from the template engine
    pub fn is_template(&self) -> bool {
        matches!(self, Error::TemplateCompile(_) | Error::TemplateRender(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
