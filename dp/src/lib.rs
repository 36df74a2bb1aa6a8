//! defpp - Definitions preprocessor
//!
//! Merges a root YAML definitions file with the files it pulls in through
//! `!include <file>` lines, then expands `{{ name }}` templates against the
//! merged dictionary until rendering no longer changes the text.
//!
//! # Pipeline
//!
//! ```text
//! root.yml ──► include (normalize each file) ──► merged text
//!                                                    │
//!              ┌─────────────── converge ◄───────────┘
//!              │  parse ─► render ─► same text? ─► dictionary
//!              └──────────◄── no ──┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use defpp::{Config, Preprocessor, to_yaml};
//!
//! let processed = Preprocessor::new(&Config::default()).process("defs/root.yml")?;
//! println!("{}", to_yaml(&processed.expansion.dictionary)?);
//! ```

pub mod cli;
pub mod config;
pub mod converge;
pub mod dictionary;
pub mod error;
pub mod expand;
pub mod include;
pub mod normalize;
pub mod preprocessor;

pub use config::{Config, VisitedScope};
pub use converge::{Convergence, Expansion};
pub use dictionary::{Dictionary, Value, parse, to_yaml};
pub use error::{Error, Result};
pub use expand::TemplateExpander;
pub use include::{IncludeResolver, IncludeWarning, Resolution, Visited};
pub use normalize::normalize;
pub use preprocessor::{Preprocessor, Processed};
