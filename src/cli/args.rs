//! Command-line interface definitions.
//!
//! Global flags (root, verbose) live on Cli and propagate to every
//! subcommand; style and exclusion flags are shared through flattened option
//! structs so fix and check accept the same set.

use crate::config::Config;
use crate::exclusion::ExclusionConfig;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "autogodoc")]
#[command(
    author,
    version,
    about = "Add or repair godoc comments on exported Go declarations"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the Go code (defaults to current directory)
    #[arg(short, long, global = true, visible_alias = "code-path")]
    pub root: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite doc comments of exported declarations in place
    Fix(FixArgs),

    /// Report exported declarations whose doc comments need fixing
    Check(CheckArgs),
}

/// How synthesized comments are rendered
#[derive(Args, Clone, Default)]
pub struct StyleOptions {
    /// Comment template, `%s` is replaced with the name [default: "// %s missing godoc."]
    #[arg(long, value_name = "TEMPLATE")]
    pub format: Option<String>,

    /// Describe declarations by splitting their names instead of using the template
    #[arg(long)]
    pub auto_description: bool,
}

/// Options shared between fix and check
#[derive(Args, Clone, Default)]
pub struct CommonOptions {
    /// Exclude files/directories matching glob pattern (can be repeated)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Don't respect .gitignore files
    #[arg(long)]
    pub no_gitignore: bool,
}

impl CommonOptions {
    /// Create an ExclusionConfig from these options, merging with config file patterns
    pub fn exclusion_config(&self, config: &Config) -> ExclusionConfig {
        let mut patterns = config.exclude.clone();
        patterns.extend(self.exclude.iter().cloned());
        ExclusionConfig {
            patterns,
            respect_gitignore: !self.no_gitignore,
        }
    }
}

#[derive(Args, Default)]
pub struct FixArgs {
    /// Specific files or directories to process
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Dry run - report files that would change without writing
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub style: StyleOptions,

    #[command(flatten)]
    pub common: CommonOptions,
}

#[derive(Args, Default)]
pub struct CheckArgs {
    /// Specific files or directories to check
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Print findings as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub style: StyleOptions,

    #[command(flatten)]
    pub common: CommonOptions,
}
