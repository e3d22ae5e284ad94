//! autogodoc: add or repair godoc comments on exported Go declarations.
//!
//! The [`engine`] module holds the pure comment logic (classification,
//! rewriting, identifier segmentation). Everything else is plumbing around
//! it: walking a source tree, parsing Go with tree-sitter, splicing fixed
//! comments back into files, configuration and the CLI.

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod exclusion;
pub mod parser;

// Re-export main types for convenience
pub use cli::{CheckArgs, Cli, Commands, FixArgs};
pub use config::{Config, ConfigError};
pub use engine::{
    classify, describe, is_exported, plan, rewrite, segment, DocDefect, DocFix, DocStyle,
};
pub use parser::{AppliedFix, DeclKind, DocTarget, FileFixes, GoParser, ParseError};
