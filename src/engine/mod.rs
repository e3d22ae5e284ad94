//! Godoc comment engine.
//!
//! Pure functions only: no I/O and no dependency on the Go parser, so every
//! call is independent and safe to run from any thread.

mod rewrite;
mod segment;

pub use rewrite::{
    classify, is_exported, placeholder_count, plan, rewrite, DocDefect, DocFix, DocStyle,
    DEFAULT_FORMAT,
};
pub use segment::{describe, segment};
