//! Natal chart calculation requests

use serde::{Deserialize, Serialize};

/// Birth parameters handed to the engine's `calculateAstrolabe` entry point.
///
/// Built per call and never persisted. `fix_leap` is always `false`; the
/// engine receives it explicitly so its own default never applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub gender: String,
    pub is_lunar: bool,
    fix_leap: bool,
}

impl CalculationRequest {
    pub fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        gender: impl Into<String>,
        is_lunar: bool,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            gender: gender.into(),
            is_lunar,
            fix_leap: false,
        }
    }

    pub fn fix_leap(&self) -> bool {
        self.fix_leap
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
