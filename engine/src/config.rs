//! Compile options, read from TOML.
//!
//! ```toml
//! document_type = "paged"
//! name = "Report"
//! pretty = true
//! max_expansions = 10000
//! timeout_ms = 2000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use folio::DocumentType;
use serde::Deserialize;
use thiserror::Error;

use crate::expander::ExpansionLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid options: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which grammar set a document is lexed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavorChoice {
    /// Plain markdown without function calls or math.
    Base,
    #[default]
    Extended,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    pub document_type: DocumentType,
    pub name: Option<String>,
    pub author: Option<String>,
    pub locale: Option<String>,
    pub flavor: FlavorChoice,
    /// Render with one child per line.
    pub pretty: bool,
    pub max_expansions: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl CompileOptions {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Limits for one compilation. The deadline starts counting now.
    pub fn limits(&self) -> ExpansionLimits {
        let mut limits = ExpansionLimits::unlimited();
        if let Some(max) = self.max_expansions {
            limits = limits.with_max_expansions(max);
        }
        if let Some(ms) = self.timeout_ms {
            limits = limits.with_timeout(Duration::from_millis(ms));
        }
        limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_gives_defaults() {
        let options = CompileOptions::from_toml_str("").unwrap();
        assert_eq!(options, CompileOptions::default());
        assert_eq!(options.limits(), ExpansionLimits::unlimited());
    }

    #[test]
    fn all_fields() {
        let options = CompileOptions::from_toml_str(
            r#"
            document_type = "slides"
            name = "Deck"
            author = "A. Person"
            locale = "en"
            flavor = "base"
            pretty = true
            max_expansions = 5
            timeout_ms = 100
            "#,
        )
        .unwrap();
        assert_eq!(options.document_type, DocumentType::Slides);
        assert_eq!(options.name.as_deref(), Some("Deck"));
        assert_eq!(options.flavor, FlavorChoice::Base);
        assert!(options.pretty);
        let limits = options.limits();
        assert_eq!(limits.max_expansions, Some(5));
        assert!(limits.deadline.is_some());
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(matches!(
            CompileOptions::from_toml_str("document_type = \"poster\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(CompileOptions::from_toml_str("colour = 1").is_err());
    }
}
