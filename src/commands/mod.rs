mod check;
mod fix;

pub use check::*;
pub use fix::*;

use crate::cli::{CommonOptions, StyleOptions};
use crate::config::Config;
use crate::engine::DocStyle;
use crate::exclusion::collect_go_files;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Everything a fix or check run needs before touching any file.
struct RunPlan {
    style: DocStyle,
    files: Vec<PathBuf>,
}

fn plan_run(
    root: &Path,
    paths: &[PathBuf],
    style: &StyleOptions,
    common: &CommonOptions,
) -> Result<RunPlan> {
    let config = Config::load(root)?;
    let doc_style = config.doc_style(style.format.as_deref(), style.auto_description)?;
    let exclusion = common.exclusion_config(&config);

    let files = collect_go_files(root, paths, &exclusion)
        .with_context(|| format!("Failed to collect Go files under {}", root.display()))?;

    tracing::info!(
        "Found {} Go files under {} (format {:?}, auto description {})",
        files.len(),
        root.display(),
        doc_style.format(),
        doc_style.auto_description()
    );

    Ok(RunPlan {
        style: doc_style,
        files,
    })
}

/// Path shown to the user: relative to root when possible.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}
