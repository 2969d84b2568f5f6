//! Ziwei Services Layer
//!
//! Collaborators around the bridge: settings, birth profiles, saved charts.

pub mod profile;
pub mod settings;
pub mod store;

pub use profile::{BirthProfile, ProfileError};
pub use settings::{RuntimeSettings, Settings, SettingsError};
pub use store::{ChartStore, JsonFileChartStore, SavedChart, StoreError};
