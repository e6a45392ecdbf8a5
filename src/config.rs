//! Configuration management for daybook.
//!
//! This module handles the `config.yaml` file in the data directory, which
//! stores the user's choices for how the board behaves.

use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What happens to a list once its last task is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyListPolicy {
    /// Empty lists stay until their group is deleted explicitly.
    #[default]
    Keep,
    /// An emptied list is removed, and a date bucket left without lists is
    /// removed with it.
    Prune,
}

/// Board configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BoardConfig {
    /// Behaviour when a list loses its last task.
    #[serde(default)]
    pub empty_lists: EmptyListPolicy,

    /// Append every committed operation to the operation journal.
    #[serde(default)]
    pub debug_logging: bool,

    /// Database file to use instead of `<data_dir>/daybook.sqlite3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
}

impl BoardConfig {
    /// Load config from a data directory, returning None if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(data_dir: &Path) -> Result<Option<Self>> {
        let config_path = paths::config_path(data_dir);
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(Some(config))
    }

    /// Save config to a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        let config_path = paths::config_path(data_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// The database file this config points at.
    #[must_use]
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        self.database.clone().unwrap_or_else(|| paths::database_path(data_dir))
    }
}

/// Ensure config exists in a data directory, writing defaults if not.
///
/// # Errors
///
/// Returns an error if config cannot be loaded or saved.
pub fn ensure_config_in(data_dir: &Path) -> Result<BoardConfig> {
    if let Some(config) = BoardConfig::load_from(data_dir)? {
        return Ok(config);
    }

    let config = BoardConfig::default();
    config.save_to(data_dir)?;
    tracing::debug!(target: "daybook", dir = %data_dir.display(), "wrote default config");
    Ok(config)
}
