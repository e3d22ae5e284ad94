//! The check command: report doc comments that fix would change.
//!
//! Nothing is written. The command fails when at least one exported
//! declaration needs a fix, which makes it usable as a CI gate.

use super::{display_path, plan_run};
use crate::cli::CheckArgs;
use crate::parser::{AppliedFix, GoParser};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// A declaration whose doc comment needs fixing
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// File path relative to root
    pub file: String,
    #[serde(flatten)]
    pub fix: AppliedFix,
}

pub fn run_check(args: &CheckArgs, root: &Path) -> Result<()> {
    let findings = check_files(args, root)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&findings)?);
    } else {
        for finding in &findings {
            let fix = &finding.fix;
            println!(
                "{}:{}: {} {}: {}",
                finding.file, fix.line, fix.kind, fix.name, fix.defect
            );
            if let Some(before) = &fix.before {
                println!("    - {}", before);
            }
            println!("    + {}", fix.after);
        }
        println!("Findings: {}", findings.len());
    }

    if !findings.is_empty() {
        anyhow::bail!("{} declarations need godoc fixes", findings.len());
    }

    Ok(())
}

/// Collect findings for every selected file, ordered by file then line.
pub fn check_files(args: &CheckArgs, root: &Path) -> Result<Vec<Finding>> {
    let plan = plan_run(root, &args.paths, &args.style, &args.common)?;
    let parser = GoParser::new();

    let per_file = plan
        .files
        .par_iter()
        .map(|path| -> Result<Vec<Finding>> {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let result = parser
                .fix_source(&source, &plan.style)
                .with_context(|| format!("Failed to parse {}", path.display()))?;

            let file = display_path(path, root);
            Ok(result
                .fixes
                .into_iter()
                .map(|fix| Finding {
                    file: file.clone(),
                    fix,
                })
                .collect())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(per_file.into_iter().flatten().collect())
}
