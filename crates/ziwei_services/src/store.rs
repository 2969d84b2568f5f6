//! Persistence of the most recent chart
//!
//! A single slot: saving replaces whatever was stored before.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use ziwei_core::RawChartPayload;

use crate::profile::BirthProfile;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chart store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("chart store at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode chart: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A chart together with the profile it was drawn for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedChart {
    pub profile: BirthProfile,
    /// The chart exactly as the engine pushed it.
    pub chart_json: String,
    pub generated_at: DateTime<Utc>,
}

impl SavedChart {
    pub fn new(profile: BirthProfile, chart: &RawChartPayload) -> Self {
        Self {
            profile,
            chart_json: chart.as_str().to_string(),
            generated_at: Utc::now(),
        }
    }

    pub fn payload(&self) -> RawChartPayload {
        RawChartPayload::new(self.chart_json.clone())
    }
}

pub trait ChartStore {
    fn save(&self, chart: &SavedChart) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing has been saved.
    fn load(&self) -> Result<Option<SavedChart>, StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Stores the chart as one JSON document on disk.
pub struct JsonFileChartStore {
    path: PathBuf,
}

impl JsonFileChartStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ChartStore for JsonFileChartStore {
    fn save(&self, chart: &SavedChart) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(chart)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        // Write beside the target and rename so a crash never leaves half a file.
        let staging = self.path.with_extension("tmp");
        std::fs::write(&staging, text).map_err(|e| self.io_error(e))?;
        std::fs::rename(&staging, &self.path).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "Chart saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<SavedChart>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BirthProfile {
        BirthProfile {
            name: "Chen".to_string(),
            gender: "male".to_string(),
            birth_year: 1990,
            birth_month: 5,
            birth_day: 1,
            birth_hour: 10,
            birth_minute: 30,
            birth_location: Some("Taipei".to_string()),
            is_lunar_date: false,
        }
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileChartStore::new(dir.path().join("nested/chart.json"));
        assert_eq!(store.load().unwrap(), None);

        let before = Utc::now();
        let chart = RawChartPayload::new(r#"{"palaces":[]}"#);
        let saved = SavedChart::new(profile(), &chart);
        assert!(saved.generated_at >= before);
        store.save(&saved).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.payload(), chart);

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn saving_replaces_previous_chart() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileChartStore::new(dir.path().join("chart.json"));

        store
            .save(&SavedChart::new(profile(), &RawChartPayload::new("{\"n\":1}")))
            .unwrap();
        let mut second = profile();
        second.name = "Wu".to_string();
        store
            .save(&SavedChart::new(second, &RawChartPayload::new("{\"n\":2}")))
            .unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.profile.name, "Wu");
        assert_eq!(loaded.chart_json, "{\"n\":2}");
        assert!(!dir.path().join("chart.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();

        let err = JsonFileChartStore::new(file.path()).load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn timestamp_is_stored_as_rfc3339() {
        let saved = SavedChart::new(profile(), &RawChartPayload::new("{}"));
        let json = serde_json::to_value(&saved).unwrap();
        let text = json["generatedAt"].as_str().unwrap();
        assert_eq!(text.parse::<DateTime<Utc>>().unwrap(), saved.generated_at);
    }
}
