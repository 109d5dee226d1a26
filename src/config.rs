//! YAML configuration.
//!
//! ```yaml
//! labels: japanese
//! columns:
//!   test-case-name: Name
//! custom-fields: [AutomationAction, AutomationEnabled]
//! ```
//!
//! The configuration only exists to produce a `Schema`; the conversion core
//! never sees it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{config_error, io_error, ConvertError};
use crate::schema::{Field, LabelPreset, Schema};

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "tlbridge.yaml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Label preset the per-field overrides apply on top of.
    pub labels: LabelPreset,
    /// Per-field header label overrides.
    pub columns: BTreeMap<Field, String>,
    /// Replaces the default custom-field list when set.
    pub custom_fields: Option<Vec<String>>,
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self, ConvertError> {
        serde_yaml::from_str(text).map_err(|err| config_error(err.to_string()).with_cause(err))
    }

    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let text = fs::read_to_string(path).map_err(|err| io_error(path.display(), err))?;
        let config = Self::from_yaml(&text)
            .map_err(|err| err.with_help(format!("while reading {}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Loads `explicit` if given, else the default file in `dir` if present,
    /// else the built-in defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConvertError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            Self::load(&fallback)
        } else {
            Ok(Self::default())
        }
    }

    /// The schema this configuration describes.
    pub fn schema(&self) -> Schema {
        let mut schema = Schema::new(self.labels);
        for (&field, label) in &self.columns {
            schema = schema.with_label(field, label.as_str());
        }
        if let Some(names) = &self.custom_fields {
            schema = schema.with_custom_fields(names.iter().cloned());
        }
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
    }

    #[test]
    fn overrides_shape_the_schema() {
        let config = Config::from_yaml(
            "labels: japanese\ncolumns:\n  test-case-name: Name\ncustom-fields: [Only]\n",
        )
        .unwrap();
        let schema = config.schema();
        assert_eq!(schema.label(Field::TestCaseName), "Name");
        assert_eq!(schema.label(Field::Version), "バージョン");
        assert_eq!(schema.custom_fields(), ["Only".to_string()]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_yaml("label: english\n").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Config { .. }));
        assert_eq!(err.code(), "tlbridge::config::config");
    }

    #[test]
    fn discover_prefers_explicit_then_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(None, dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "labels: japanese\n").unwrap();
        let found = Config::discover(None, dir.path()).unwrap();
        assert_eq!(found.labels, LabelPreset::Japanese);

        let explicit = dir.path().join("other.yaml");
        std::fs::write(&explicit, "custom-fields: []\n").unwrap();
        let chosen = Config::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(chosen.labels, LabelPreset::English);
        assert_eq!(chosen.custom_fields, Some(vec![]));
    }
}
