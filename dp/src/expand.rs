//! Template expansion
//!
//! Renders definitions text as a handlebars template with a dictionary as the
//! root context.

use handlebars::{Handlebars, Template};
use tracing::debug;

use crate::dictionary::Dictionary;
use crate::error::Result;

/// Compiles and renders definitions text against a dictionary
pub struct TemplateExpander {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
}

impl TemplateExpander {
    /// Create an expander; `strict` makes a missing field a render error
    pub fn new(strict: bool) -> Self {
        debug!(%strict, "TemplateExpander::new: called");
        let mut hbs = Handlebars::new();
        // Output is YAML, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.set_strict_mode(strict);
        Self { hbs }
    }

    /// Render `text` with `dict` as the root context
    ///
    /// Compilation and execution errors are returned as distinct error kinds;
    /// nothing is rendered on failure.
    pub fn render(&self, text: &str, dict: &Dictionary) -> Result<String> {
        debug!(text_len = text.len(), keys = dict.len(), "TemplateExpander::render: called");
        // Compiled up front only so syntax errors surface as TemplateCompile;
        // render_template compiles again and would report them as render errors
        Template::compile(text)?;
        let rendered = self.hbs.render_template(text, dict)?;
        debug!(rendered_len = rendered.len(), "TemplateExpander::render: done");
        Ok(rendered)
    }
}

impl Default for TemplateExpander {
    fn default() -> Self {
        Self::new(false)
    }
}

impl std::fmt::Debug for TemplateExpander {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateExpander")
            .field("strict", &self.hbs.strict_mode())
            .finish()
    }
}
