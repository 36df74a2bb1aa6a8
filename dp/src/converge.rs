//! Fixed-point template expansion
//!
//! A template value may expand to text that is itself a template (or may
//! reference a key whose value is still unexpanded), so one render is not
//! enough. The loop parses the current text into a fresh dictionary, renders
//! the text against it, and stops once a render reproduces its input exactly.
//!
//! With no iteration cap a template that changes on every render never
//! converges and the loop does not terminate. `a: "x{{ a }}"` is the simplest
//! example: each pass prepends another `x`.

use tracing::{debug, info, warn};

use crate::dictionary::{self, Dictionary};
use crate::error::{Error, Result};
use crate::expand::TemplateExpander;

/// Outcome of a converged expansion
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Dictionary parsed from the fixed-point text
    pub dictionary: Dictionary,
    /// The fixed-point text itself
    pub text: String,
    /// Number of parse/render passes, at least one
    pub iterations: usize,
}

/// Drives parse/render passes until the text stops changing
#[derive(Debug)]
pub struct Convergence<'a> {
    expander: &'a TemplateExpander,
    max_iterations: Option<usize>,
}

impl<'a> Convergence<'a> {
    pub fn new(expander: &'a TemplateExpander, max_iterations: Option<usize>) -> Self {
        Self {
            expander,
            max_iterations,
        }
    }

    /// Expand `merged` to its fixed point
    pub fn run(&self, merged: &str) -> Result<Expansion> {
        debug!(merged_len = merged.len(), max_iterations = ?self.max_iterations, "Convergence::run: called");
        let mut current = merged.to_string();
        let mut iterations = 0;

        loop {
            if let Some(max) = self.max_iterations
                && iterations >= max
            {
                warn!(iterations, "Templates did not converge");
                return Err(Error::DidNotConverge { iterations });
            }
            iterations += 1;

            let dictionary = dictionary::parse(&current)?;
            let rendered = self.expander.render(&current, &dictionary)?;

            if rendered == current {
                info!(iterations, keys = dictionary.len(), "Templates converged");
                return Ok(Expansion {
                    dictionary,
                    text: current,
                    iterations,
                });
            }

            debug!(iterations, rendered_len = rendered.len(), "Convergence::run: text changed");
            current = rendered;
        }
    }
}
