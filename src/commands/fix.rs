//! The fix command: rewrite doc comments in place.
//!
//! Files are processed in parallel. The first file that cannot be read,
//! parsed or written aborts the run; files already written stay written.

use super::{display_path, plan_run};
use crate::cli::FixArgs;
use crate::engine::DocStyle;
use crate::parser::{AppliedFix, GoParser};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Totals for one fix run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FixSummary {
    pub scanned: usize,
    pub files_changed: usize,
    pub declarations_fixed: usize,
}

/// What happened to a single file
struct FileOutcome {
    path: PathBuf,
    fixes: Vec<AppliedFix>,
}

pub fn run_fix(args: &FixArgs, root: &Path) -> Result<()> {
    let summary = fix_files(args, root)?;

    let verb = if args.dry_run { "Would fix" } else { "Fixed" };
    println!(
        "{}: {} declarations in {} files, Scanned: {} files",
        verb, summary.declarations_fixed, summary.files_changed, summary.scanned
    );

    Ok(())
}

/// Fix every selected file and return the totals.
pub fn fix_files(args: &FixArgs, root: &Path) -> Result<FixSummary> {
    let plan = plan_run(root, &args.paths, &args.style, &args.common)?;
    let parser = GoParser::new();

    tracing::info!(
        "Adding godoc to each exported declaration in {}",
        root.display()
    );

    let outcomes = plan
        .files
        .par_iter()
        .map(|path| fix_file(path, &parser, &plan.style, args.dry_run))
        .collect::<Result<Vec<_>>>()?;

    let mut summary = FixSummary {
        scanned: outcomes.len(),
        ..FixSummary::default()
    };

    for outcome in outcomes.iter().filter(|o| !o.fixes.is_empty()) {
        summary.files_changed += 1;
        summary.declarations_fixed += outcome.fixes.len();

        if args.dry_run {
            println!(
                "{}: {} declarations",
                display_path(&outcome.path, root),
                outcome.fixes.len()
            );
        }
    }

    Ok(summary)
}

fn fix_file(
    path: &Path,
    parser: &GoParser,
    style: &DocStyle,
    dry_run: bool,
) -> Result<FileOutcome> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let result = parser
        .fix_source(&source, style)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    for fix in &result.fixes {
        tracing::debug!(
            "{}:{}: {} {} ({}) -> {:?}",
            path.display(),
            fix.line,
            fix.kind,
            fix.name,
            fix.defect,
            fix.after
        );
    }

    if result.is_changed() && !dry_run {
        fs::write(path, &result.source)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Fixed {} declarations in {}", result.fixes.len(), path.display());
    }

    Ok(FileOutcome {
        path: path.to_path_buf(),
        fixes: result.fixes,
    })
}
