//! File selection for a fix or check run.
//!
//! Walks the requested paths and keeps the Go files whose doc comments we are
//! allowed to touch.
//!
//! Invariants:
//!     - `vendor` and the other default directories are never entered, even
//!       when named explicitly or used as the root
//!     - `_test.go` files are never returned
//!     - Generated files (name or first line says so) are never returned
//!     - Output is sorted and free of duplicates
//!
//! Gotchas:
//!     - The ignore crate's override patterns are inclusive by default, so user
//!       patterns are negated before being added
//!     - Paths named explicitly on the command line bypass the walker, so they
//!       are checked against the exclude globset separately

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::parser::is_go_file;

/// Configuration for file exclusion during directory walking
pub struct ExclusionConfig {
    /// Glob patterns to exclude (from --exclude flags and autogodoc.toml)
    pub patterns: Vec<String>,
    /// Whether to respect .gitignore files (default: true)
    pub respect_gitignore: bool,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// Default directories that are always excluded
const DEFAULT_EXCLUDED_DIRS: &[&str] = &[".git", "vendor", "testdata", "node_modules"];

/// Suffix of Go test files
const TEST_FILE_SUFFIX: &str = "_test.go";

/// Build a WalkBuilder with the given exclusion configuration
pub fn build_walker(root: &Path, config: &ExclusionConfig) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);

    builder.git_ignore(config.respect_gitignore);
    builder.git_global(config.respect_gitignore);
    builder.git_exclude(config.respect_gitignore);
    builder.hidden(false);

    let mut overrides = OverrideBuilder::new(root);

    for dir in DEFAULT_EXCLUDED_DIRS {
        let _ = overrides.add(&format!("!{}/**", dir));
        let _ = overrides.add(&format!("!**/{}/**", dir));
        let _ = overrides.add(&format!("!{}", dir));
    }

    for pattern in &config.patterns {
        if let Err(e) = overrides.add(&format!("!{}", pattern)) {
            tracing::warn!("Invalid exclude pattern '{}': {}", pattern, e);
        }
    }

    match overrides.build() {
        Ok(built) => {
            builder.overrides(built);
        }
        Err(e) => tracing::warn!("Failed to build exclude overrides: {}", e),
    }

    builder
}

/// Build a GlobSet from patterns for additional filtering
pub fn build_exclude_globset(patterns: &[String]) -> Option<GlobSet> {
    if patterns.is_empty() {
        return None;
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                tracing::warn!("Invalid exclude pattern '{}': {}", pattern, e);
            }
        }
    }

    builder.build().ok()
}

/// Check if a directory name should be excluded by default
pub fn is_default_excluded_dir(name: &str) -> bool {
    DEFAULT_EXCLUDED_DIRS.contains(&name)
}

/// Check if a file is a Go test file
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(TEST_FILE_SUFFIX))
        .unwrap_or(false)
}

/// Check if a file is generated code.
///
/// A file counts as generated when its name contains "generated", or its
/// first line contains "generated" or "GENERATED".
pub fn is_generated_file(path: &Path) -> io::Result<bool> {
    let named_generated = path
        .file_name()
        .map(|name| name.to_string_lossy().contains("generated"))
        .unwrap_or(false);
    if named_generated {
        return Ok(true);
    }

    let mut first_line = Vec::new();
    BufReader::new(File::open(path)?).read_until(b'\n', &mut first_line)?;
    let first_line = String::from_utf8_lossy(&first_line);
    Ok(first_line.contains("generated") || first_line.contains("GENERATED"))
}

/// Whether `path` lies in a default excluded directory, counting `base`
/// itself and every component between `base` and `path`.
fn in_excluded_dir(path: &Path, base: &Path) -> bool {
    let base_excluded = base
        .file_name()
        .map(|name| is_default_excluded_dir(&name.to_string_lossy()))
        .unwrap_or(false);

    base_excluded
        || path
            .strip_prefix(base)
            .unwrap_or(path)
            .components()
            .any(|c| is_default_excluded_dir(&c.as_os_str().to_string_lossy()))
}

/// Whether a Go file should be handed to the rewriter.
fn is_candidate(path: &Path) -> io::Result<bool> {
    if !is_go_file(path) || is_test_file(path) {
        return Ok(false);
    }
    Ok(!is_generated_file(path)?)
}

/// Collect the Go files to process under `paths` (relative to `root`).
///
/// With no paths the whole root is walked.
pub fn collect_go_files(
    root: &Path,
    paths: &[PathBuf],
    config: &ExclusionConfig,
) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let extra = build_exclude_globset(&config.patterns);

    let paths = if paths.is_empty() {
        vec![root.to_path_buf()]
    } else {
        paths.to_vec()
    };

    for path in paths {
        let full_path = if path.is_absolute() {
            path
        } else {
            root.join(&path)
        };

        let base = if full_path.starts_with(root) {
            root
        } else {
            full_path.parent().unwrap_or(root)
        };
        if in_excluded_dir(&full_path, base) {
            tracing::debug!("Excluded directory: {}", full_path.display());
            continue;
        }

        if full_path.is_file() {
            let relative = full_path.strip_prefix(root).unwrap_or(&full_path);
            if let Some(globset) = &extra {
                if globset.is_match(relative) {
                    tracing::debug!("Excluded by pattern: {}", relative.display());
                    continue;
                }
            }
            if is_candidate(&full_path)? {
                files.push(full_path);
            }
        } else if full_path.is_dir() {
            for entry in build_walker(&full_path, config).build() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("Skipping unreadable entry: {}", e);
                        continue;
                    }
                };
                let path = entry.path();
                if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                    continue;
                }
                if in_excluded_dir(path, &full_path) {
                    continue;
                }
                if is_candidate(path)? {
                    files.push(path.to_path_buf());
                } else {
                    tracing::trace!("Not a candidate: {}", path.display());
                }
            }
        } else {
            tracing::warn!("Path not found: {}", full_path.display());
        }
    }

    // Deterministic ordering + de-dup (e.g. overlapping input paths)
    files.sort();
    files.dedup();
    Ok(files)
}
