//! Settings management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use ziwei_bridge::BridgeConfig;
use ziwei_script::ScriptConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Bridge settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bridge: BridgeConfig,
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Engine bundle loaded into the runtime at startup.
    pub bundle_path: PathBuf,
    /// Glue script defining the bridge entry points; the built-in glue is
    /// used when unset.
    pub glue_path: Option<PathBuf>,
    pub script: ScriptConfig,
    /// Where the last generated chart is saved.
    pub chart_store_path: PathBuf,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            bundle_path: PathBuf::from("assets/iztro.bundle.js"),
            glue_path: None,
            script: ScriptConfig::default(),
            chart_store_path: PathBuf::from("ziwei_chart.json"),
        }
    }
}

impl Settings {
    /// Load from a JSON file; fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Settings loaded");
        Ok(settings)
    }

    /// [`load`](Self::load) when the file exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "No settings file, using defaults");
            Ok(Self::default())
        }
    }
}
