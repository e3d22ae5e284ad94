//! Go source parsing.
//!
//! Everything tree-sitter related lives here; the comment engine never sees a
//! syntax tree.

mod go;

use thiserror::Error;

pub use go::{AppliedFix, CommentLine, DeclKind, DocTarget, FileFixes, GoParser};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse source: {0}")]
    ParseError(String),
}

/// File extension handled by the parser.
pub const GO_EXTENSION: &str = "go";

/// Whether `path` looks like a Go source file.
pub fn is_go_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext == GO_EXTENSION)
        .unwrap_or(false)
}
