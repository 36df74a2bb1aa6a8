//! Include resolution
//!
//! Reads a definitions file, strips its `!include <file>` lines and appends
//! the resolved content of each included file after the file's own body.
//! Every file's contribution is preceded by a provenance header so the merged
//! text can be traced back to its sources.
//!
//! ```text
//! #!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!
//! #!! defs/root.yml !!
//! #!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!
//! ...root body...
//! #!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!
//! #!! defs/common.yml !!
//! ...
//! ```
//!
//! Because included blocks come after the including body, a key defined in an
//! included file overrides the same key in the file that included it.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::VisitedScope;
use crate::error::{Error, Result};
use crate::normalize::normalize;

/// Marker that starts an include directive line
pub const INCLUDE_MARKER: &str = "!include ";

/// Width of the provenance separator line, after its leading `#`
const SEPARATOR_WIDTH: usize = 90;

/// Ordered set of files already pulled into the current resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visited {
    paths: Vec<PathBuf>,
}

impl Visited {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Add a path; returns false if it was already present
    pub fn insert(&mut self, path: PathBuf) -> bool {
        if self.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

/// A dropped include directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeWarning {
    /// File the directive named
    pub path: PathBuf,
    /// File that contained the directive
    pub included_from: PathBuf,
}

impl IncludeWarning {
    /// Promote this warning to a hard error
    pub fn into_error(self) -> Error {
        Error::DuplicateInclude {
            path: self.path,
            included_from: self.included_from,
        }
    }
}

impl std::fmt::Display for IncludeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "File included twice [{}] (from {})",
            self.path.display(),
            self.included_from.display()
        )
    }
}

/// Result of resolving a root document
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Root document followed by its transitive includes, depth first
    pub text: String,
    /// Directives dropped because their file was already included
    pub warnings: Vec<IncludeWarning>,
    /// Every file that contributed to `text`, in inclusion order
    pub visited: Visited,
}

/// Resolves `!include` directives recursively
#[derive(Debug, Clone, Default)]
pub struct IncludeResolver {
    scope: VisitedScope,
}

impl IncludeResolver {
    pub fn new(scope: VisitedScope) -> Self {
        Self { scope }
    }

    /// Resolve a root document and everything it includes
    pub fn resolve(&self, root: impl AsRef<Path>) -> Result<Resolution> {
        let root = absolute(root.as_ref());
        debug!(?root, scope = ?self.scope, "IncludeResolver::resolve: called");

        let mut visited = Visited::new();
        visited.insert(root.clone());
        let mut warnings = Vec::new();
        let mut all = Visited::new();

        let text = self.resolve_file(&root, &mut visited, &mut warnings, &mut all)?;

        info!(files = all.len(), warnings = warnings.len(), "Include resolution complete");
        Ok(Resolution {
            text,
            warnings,
            visited: all,
        })
    }

    fn resolve_file(
        &self,
        path: &Path,
        visited: &mut Visited,
        warnings: &mut Vec<IncludeWarning>,
        all: &mut Visited,
    ) -> Result<String> {
        debug!(?path, visited = visited.len(), "IncludeResolver::resolve_file: called");
        let raw = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        all.insert(path.to_path_buf());

        let document = Document::split(path, &normalize(&raw));

        let mut includes = Vec::with_capacity(document.includes.len());
        for include in document.includes {
            if visited.contains(&include) || includes.contains(&include) {
                let warning = IncludeWarning {
                    path: include,
                    included_from: path.to_path_buf(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            } else {
                includes.push(include);
            }
        }

        // Siblings are registered before any of them is resolved
        for include in &includes {
            visited.insert(include.clone());
        }

        let mut blocks = vec![document.body];
        for include in &includes {
            debug!(?include, "IncludeResolver::resolve_file: descending");
            let block = match self.scope {
                VisitedScope::Shared => self.resolve_file(include, visited, warnings, all)?,
                VisitedScope::PerBranch => {
                    let mut branch = visited.clone();
                    self.resolve_file(include, &mut branch, warnings, all)?
                }
            };
            blocks.push(block);
        }

        Ok(blocks.join("\n"))
    }
}

/// A single definitions file split into its body and include targets
struct Document {
    body: String,
    includes: Vec<PathBuf>,
}

impl Document {
    fn split(path: &Path, text: &str) -> Self {
        let dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut lines = provenance_header(path);
        let mut includes = Vec::new();

        for line in text.split('\n') {
            if let Some(target) = line.strip_prefix(INCLUDE_MARKER) {
                let target = target.trim_end();
                debug!(%target, "Document::split: include directive");
                includes.push(lexical_normalize(&dir.join(target)));
            } else {
                lines.push(line.to_string());
            }
        }

        Self {
            body: lines.join("\n"),
            includes,
        }
    }
}

fn provenance_header(path: &Path) -> Vec<String> {
    let separator = format!("#{}", "!".repeat(SEPARATOR_WIDTH));
    vec![separator.clone(), format!("#!! {} !!", path.display()), separator]
}

/// Make a path absolute without touching the filesystem
fn absolute(path: &Path) -> PathBuf {
    let joined = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    lexical_normalize(&joined)
}

/// Fold `.` and `..` components without resolving symlinks
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}
