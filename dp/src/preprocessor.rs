//! Preprocessor entry point
//!
//! Wires include resolution and convergence together behind one [`Config`].

use std::path::Path;

use tracing::{debug, info};

use crate::config::Config;
use crate::converge::{Convergence, Expansion};
use crate::error::Result;
use crate::expand::TemplateExpander;
use crate::include::{IncludeResolver, IncludeWarning, Resolution};

/// Result of a full preprocessing run
#[derive(Debug, Clone)]
pub struct Processed {
    /// Merged text before any template was rendered
    pub merged: String,
    /// Include directives that were dropped
    pub warnings: Vec<IncludeWarning>,
    /// Converged dictionary and text
    pub expansion: Expansion,
}

/// Resolves and expands definitions files
#[derive(Debug)]
pub struct Preprocessor {
    resolver: IncludeResolver,
    expander: TemplateExpander,
    strict_includes: bool,
    max_iterations: Option<usize>,
}

impl Preprocessor {
    pub fn new(config: &Config) -> Self {
        debug!(?config, "Preprocessor::new: called");
        Self {
            resolver: IncludeResolver::new(config.visited_scope),
            expander: TemplateExpander::new(config.strict_templates),
            strict_includes: config.strict_includes,
            max_iterations: config.max_iterations,
        }
    }

    /// Merge `root` with everything it includes
    ///
    /// With `strict_includes` the first dropped directive becomes an error.
    pub fn resolve(&self, root: impl AsRef<Path>) -> Result<Resolution> {
        let mut resolution = self.resolver.resolve(root)?;
        if self.strict_includes && !resolution.warnings.is_empty() {
            return Err(resolution.warnings.remove(0).into_error());
        }
        Ok(resolution)
    }

    /// Expand merged text to its fixed point
    pub fn expand(&self, merged: &str) -> Result<Expansion> {
        Convergence::new(&self.expander, self.max_iterations).run(merged)
    }

    /// Resolve and expand in one go
    pub fn process(&self, root: impl AsRef<Path>) -> Result<Processed> {
        let root = root.as_ref();
        info!("Processing {}", root.display());
        let Resolution { text, warnings, .. } = self.resolve(root)?;
        let expansion = self.expand(&text)?;
        Ok(Processed {
            merged: text,
            warnings,
            expansion,
        })
    }
}
