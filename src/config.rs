//! Configuration file parsing for autogodoc.toml.
//!
//! Invariants:
//!     - Config::load returns the default config if autogodoc.toml doesn't exist
//!     - The resolved DocStyle is built once per run and never mutated
//!     - CLI flags win over the file; exclude patterns from both are merged
//!
//! Gotchas:
//!     - A format template must be a single line with exactly one `%s` (`%%`
//!       is a literal percent), and the line it renders must already satisfy
//!       the rewriter, or repeated runs would keep editing the same comment

use crate::engine::{classify, placeholder_count, DocDefect, DocStyle, DEFAULT_FORMAT};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the project root
pub const CONFIG_FILE: &str = "autogodoc.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid comment format {format:?}: {reason}")]
    InvalidFormat { format: String, reason: String },
}

/// Main configuration structure matching autogodoc.toml
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Comment template with one `%s` for the identifier name
    pub format: Option<String>,

    /// Synthesize a description from the identifier instead of using `format`
    pub auto_description: bool,

    /// Exclusion patterns (gitignore-style)
    pub exclude: Vec<String>,
}

impl Config {
    /// Load configuration from autogodoc.toml in the given root directory
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;

        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?;

        tracing::debug!("Loaded {}", config_path.display());
        Ok(config)
    }

    /// Resolve the doc style, letting CLI values override the file.
    pub fn doc_style(
        &self,
        cli_format: Option<&str>,
        cli_auto_description: bool,
    ) -> Result<DocStyle, ConfigError> {
        let format = cli_format
            .or(self.format.as_deref())
            .unwrap_or(DEFAULT_FORMAT);
        validate_format(format)?;

        Ok(DocStyle::new(
            format,
            cli_auto_description || self.auto_description,
        ))
    }
}

/// Check that a comment template is usable.
pub fn validate_format(format: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidFormat {
        format: format.to_string(),
        reason: reason.to_string(),
    };

    if format.contains(['\n', '\r']) {
        return Err(invalid("must be a single line"));
    }

    match placeholder_count(format) {
        None => return Err(invalid("unsupported % verb, use %% for a literal percent")),
        Some(0) => return Err(invalid("missing %s placeholder for the name")),
        Some(1) => {}
        Some(_) => return Err(invalid("more than one %s placeholder")),
    }

    let probe = "Probe";
    let rendered = DocStyle::new(format, false).render(probe);
    match classify(probe, &[rendered]) {
        DocDefect::WellFormed | DocDefect::JustName => Ok(()),
        _ => Err(invalid("rendered comment must start with \"// %s \"")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.format.is_none());
        assert!(!config.auto_description);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_basic_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"
format = "// %s TODO: document."
auto_description = true
exclude = ["internal/legacy/**", "*.pb.go"]
"#;
        fs::write(temp_dir.path().join(CONFIG_FILE), config_content).unwrap();

        let config = Config::load(temp_dir.path()).unwrap();
        assert_eq!(config.format.as_deref(), Some("// %s TODO: document."));
        assert!(config.auto_description);
        assert_eq!(config.exclude, vec!["internal/legacy/**", "*.pb.go"]);
    }

    #[test]
    fn test_load_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE), "format = [").unwrap();

        let err = Config::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_doc_style_defaults() {
        let style = Config::default().doc_style(None, false).unwrap();
        assert_eq!(style, DocStyle::default());
    }

    #[test]
    fn test_doc_style_cli_overrides_file() {
        let config = Config {
            format: Some("// %s from file.".to_string()),
            auto_description: false,
            exclude: vec![],
        };

        let style = config.doc_style(None, false).unwrap();
        assert_eq!(style.format(), "// %s from file.");

        let style = config.doc_style(Some("// %s from cli."), true).unwrap();
        assert_eq!(style.format(), "// %s from cli.");
        assert!(style.auto_description());
    }

    #[test]
    fn test_doc_style_file_auto_description() {
        let config = Config {
            auto_description: true,
            ..Config::default()
        };
        assert!(config.doc_style(None, false).unwrap().auto_description());
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format(DEFAULT_FORMAT).is_ok());
        assert!(validate_format("// %s").is_ok());
        assert!(validate_format("// %s TODO").is_ok());

        assert!(validate_format("// missing godoc.").is_err());
        assert!(validate_format("// %s %s").is_err());
        assert!(validate_format("//%s: TODO").is_err());
        assert!(validate_format("/* %s */").is_err());

        assert!(validate_format("// %s x\nbroken").is_err());
        assert!(validate_format("// %s x\r\n").is_err());
        assert!(validate_format("// %s 100%% undocumented.").is_ok());
        assert!(validate_format("// %s 100% undocumented.").is_err());
    }

    #[test]
    fn test_invalid_format_message() {
        let err = Config::default().doc_style(Some("TODO"), false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid comment format \"TODO\": missing %s placeholder for the name"
        );
    }
}
