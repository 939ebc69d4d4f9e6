//! User settings
//!
//! Settings are stored as pretty printed JSON. Unknown or missing fields fall
//! back to their defaults so older files keep loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::{MoneyError, MoneyResult};

/// Statement reconciliation preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// Match transactions on the actual date only
    #[serde(default)]
    pub ignore_execution_date: bool,
}

/// User settings for the money manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub reconciliation: ReconcileSettings,

    /// Directory the last statement was opened from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_statement_dir: Option<PathBuf>,

    /// Directory the last report was written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_report_dir: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            reconciliation: ReconcileSettings::default(),
            last_statement_dir: None,
            last_report_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults if the file doesn't exist
    pub fn load(path: &Path) -> MoneyResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file missing, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| MoneyError::Config(format!("Failed to parse settings file: {}", e)))
    }

    /// Save settings to `path`, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> MoneyResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
