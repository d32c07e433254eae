//! Host service description loading
//!
//! The service description is the host's configuration document. It is parsed
//! into a format-neutral JSON value: the `custom` member feeds
//! [`ScriptableConfig`], and the whole document is handed to scripts as host
//! state.

use crate::scriptable::ScriptableConfig;
use crate::{Error, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Service description file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFormat {
    /// `.yml` / `.yaml` (also the fallback for unknown extensions)
    Yaml,
    /// `.json`
    Json,
    /// `.toml`
    Toml,
}

impl ServiceFormat {
    /// Guess the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    /// Parse a document in this format
    pub fn parse(self, content: &str) -> std::result::Result<Value, String> {
        match self {
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// A parsed host service description
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescription {
    path: Option<PathBuf>,
    document: Value,
}

impl ServiceDescription {
    /// Load a service description from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::ServiceLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let format = ServiceFormat::from_path(path);
        tracing::debug!(path = %path.display(), ?format, "Loading service description");

        let document = format.parse(&content).map_err(|message| Error::ServiceLoad {
            path: path.to_path_buf(),
            message,
        })?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            document: normalize_empty(document),
        })
    }

    /// Wrap an already parsed document
    #[must_use]
    pub fn from_value(document: Value) -> Self {
        Self {
            path: None,
            document: normalize_empty(document),
        }
    }

    /// Where the description was loaded from, if it came from a file
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The full document
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Consume and return the full document
    #[must_use]
    pub fn into_document(self) -> Value {
        self.document
    }

    /// The `custom` extensions namespace, if present
    #[must_use]
    pub fn custom(&self) -> Option<&Value> {
        self.document.get("custom")
    }

    /// Normalized hook configuration from the `custom` namespace
    #[must_use]
    pub fn scriptable_config(&self) -> ScriptableConfig {
        ScriptableConfig::from_custom(self.custom())
    }
}

/// A `null` document (e.g. a YAML file holding only `~`) is an empty mapping
fn normalize_empty(document: Value) -> Value {
    if document.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        document
    }
}
