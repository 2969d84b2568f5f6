//! Fortune lookup payloads
//!
//! Each lookup answers from state the engine computed during the last chart
//! calculation. The shapes here are the `data` member of a
//! [`LookupEnvelope`](crate::LookupEnvelope).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four lookup entry points exposed by the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Decadal,
    Yearly,
    Monthly,
    Daily,
}

impl LookupKind {
    /// Global function name inside the runtime.
    pub fn function_name(self) -> &'static str {
        match self {
            LookupKind::Decadal => "getDecadalData",
            LookupKind::Yearly => "getYearlyData",
            LookupKind::Monthly => "getMonthlyData",
            LookupKind::Daily => "getDailyData",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupKind::Decadal => "decadal",
            LookupKind::Yearly => "yearly",
            LookupKind::Monthly => "monthly",
            LookupKind::Daily => "daily",
        };
        f.write_str(name)
    }
}

/// Ten-year period (大运) covering a given age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecadalData {
    pub palace: String,
    pub palace_index: i32,
    /// Inclusive age range, normally `[start, end]`.
    pub range: Vec<i32>,
    pub heavenly_stem: String,
    pub earthly_branch: String,
    #[serde(default)]
    pub stars: Option<Vec<String>>,
}

/// Yearly period (流年).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyData {
    pub year: i32,
    pub palaces: Vec<YearlyPalace>,
    /// Transformation stars active for the year.
    pub mutagen: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyPalace {
    pub name: String,
    pub index: i32,
    pub jiangqian12: Vec<String>,
    pub suiqian12: Vec<String>,
}

/// Monthly period (流月).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyData {
    pub year: i32,
    pub month: u32,
    pub palaces: Vec<MonthlyPalace>,
    pub main_influence: String,
    pub scores: FortuneScores,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPalace {
    pub name: String,
    pub index: i32,
    pub is_monthly_focus: bool,
}

/// Daily period (流日).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyData {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// 0 = Sunday, as produced by the script runtime's `Date.getDay()`.
    pub weekday: u32,
    pub lunar_day: String,
    pub lucky_hours: Vec<String>,
    pub suitable: Vec<String>,
    pub avoid: Vec<String>,
    pub scores: FortuneScores,
    pub main_palace: i32,
}

/// Score breakdown shared by monthly and daily lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FortuneScores {
    pub overall: i32,
    pub career: i32,
    pub love: i32,
    pub wealth: i32,
    pub health: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names_match_bundle_entry_points() {
        assert_eq!(LookupKind::Decadal.function_name(), "getDecadalData");
        assert_eq!(LookupKind::Yearly.function_name(), "getYearlyData");
        assert_eq!(LookupKind::Monthly.function_name(), "getMonthlyData");
        assert_eq!(LookupKind::Daily.function_name(), "getDailyData");
    }

    #[test]
    fn decadal_stars_are_optional() {
        let json = r#"{"palace":"命宫","palaceIndex":2,"range":[24,33],"heavenlyStem":"甲","earthlyBranch":"子"}"#;
        let data: DecadalData = serde_json::from_str(json).unwrap();
        assert_eq!(data.palace_index, 2);
        assert_eq!(data.range, vec![24, 33]);
        assert!(data.stars.is_none());
    }

    #[test]
    fn daily_uses_camel_case_keys() {
        let json = r#"{
            "year": 2024, "month": 3, "day": 9, "weekday": 6, "lunarDay": "廿九",
            "luckyHours": ["子时"], "suitable": ["出行"], "avoid": [],
            "scores": {"overall": 80, "career": 70, "love": 60, "wealth": 75, "health": 90},
            "mainPalace": 4
        }"#;
        let data: DailyData = serde_json::from_str(json).unwrap();
        assert_eq!(data.lunar_day, "廿九");
        assert_eq!(data.lucky_hours, vec!["子时".to_string()]);
        assert_eq!(data.scores.health, 90);
        assert_eq!(data.main_palace, 4);
    }
}
