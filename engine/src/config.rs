//! Export settings

use crate::utils::paths::is_plain_file_name;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Errors from loading or saving export settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid manifest name: {0}")]
    InvalidManifestName(String),

    #[error("Invalid id prefix: {0}")]
    InvalidIdPrefix(String),
}

/// Settings controlling how a tour package is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name of the tour descriptor inside the destination directory
    pub manifest_name: String,
    /// Prefix of generated state ids, followed by the state index
    pub id_prefix: String,
    /// Replace media files already present in the destination
    pub overwrite_assets: bool,
    /// Indent the descriptor instead of writing it on one line
    pub pretty_json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            manifest_name: "tour.json".to_string(),
            id_prefix: "state_".to_string(),
            overwrite_assets: true,
            pretty_json: false,
        }
    }
}

impl ExportConfig {
    /// Id of the state at `index`
    pub fn state_id(&self, index: usize) -> String {
        format!("{}{index}", self.id_prefix)
    }

    /// Full path of the descriptor inside `destination`
    pub fn manifest_path(&self, destination: &Path) -> PathBuf {
        let path = destination.join(&self.manifest_name);
        debug!(path = ?path, "Resolved manifest path");
        path
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_plain_file_name(&self.manifest_name) {
            return Err(ConfigError::InvalidManifestName(self.manifest_name.clone()));
        }
        // Ids double as media file names, so the prefix must stay inside the destination
        if !self.id_prefix.is_empty() && !is_plain_file_name(&self.id_prefix) {
            return Err(ConfigError::InvalidIdPrefix(self.id_prefix.clone()));
        }
        Ok(())
    }

    /// Save settings to a specific path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        info!("Saved export settings to {:?}", path.as_ref());
        Ok(())
    }

    /// Load settings from a specific path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        info!("Loaded export settings from {:?}", path.as_ref());
        Ok(config)
    }

    /// Load settings, falling back to defaults when the file is missing or unreadable
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No export settings file found, using defaults");
            return Self::default();
        }

        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load export settings: {}. Using defaults.", e);
                Self::default()
            }
        }
    }
}
