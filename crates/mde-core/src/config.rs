//! Editor configuration.
//!
//! Every field has a default so a partial file (or none at all) works.
//! Files are read by extension: `.toml` or `.json`.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::path::Path;

use crate::error::ConfigError;

/// Host platform, used for shortcut labels and the `Mod` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    #[default]
    Other,
}

impl Platform {
    pub fn is_mac(self) -> bool {
        matches!(self, Platform::Mac)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// MIME patterns accepted for upload, e.g. `image/*` or `application/pdf`.
    /// Empty accepts everything.
    pub allowed_types: Vec<SmolStr>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_types: vec![SmolStr::new_static("image/*")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSyncConfig {
    /// How often the preview re-renders. Cursor-follow scrolling after an
    /// edit waits this long plus 300ms so the preview has caught up.
    pub preview_interval_ms: u64,
}

impl Default for ScrollSyncConfig {
    fn default() -> Self {
        Self {
            preview_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Whitespace inserted by the indent command.
    pub indent_unit: SmolStr,
    pub read_only: bool,
    pub platform: Platform,
    pub upload: UploadConfig,
    pub scroll_sync: ScrollSyncConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_unit: SmolStr::new_static("  "),
            read_only: false,
            platform: Platform::default(),
            upload: UploadConfig::default(),
            scroll_sync: ScrollSyncConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load a config file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|ext| ext.to_str());
        let read = || {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let config = match ext {
            Some("toml") => Self::from_toml(&read()?)?,
            Some("json") => Self::from_json(&read()?)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ));
            }
        };
        tracing::debug!(path = %path.display(), "loaded editor config");
        Ok(config)
    }

    pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    pub fn from_json(src: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(src)?)
    }
}
