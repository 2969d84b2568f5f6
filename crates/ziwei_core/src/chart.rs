//! Raw chart payloads
//!
//! The engine pushes the full natal chart as one JSON document. The bridge
//! treats it as opaque; [`RawChartPayload::summary`] offers a partial typed
//! view for logging and quick inspection.

use serde_json::Value;
use std::fmt;

/// Chart JSON exactly as pushed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChartPayload(String);

impl RawChartPayload {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode palace names and the names of every star listed in each palace.
    pub fn summary(&self) -> serde_json::Result<ChartSummary> {
        let root: Value = serde_json::from_str(&self.0)?;
        let text = |key: &str| root.get(key).and_then(Value::as_str).map(str::to_owned);

        let palaces = root
            .get("palaces")
            .and_then(Value::as_array)
            .map(|palaces| palaces.iter().map(PalaceSummary::from_value).collect())
            .unwrap_or_default();

        Ok(ChartSummary {
            solar_date: text("solarDate"),
            lunar_date: text("lunarDate"),
            five_elements_class: text("fiveElementsClass"),
            palaces,
        })
    }
}

impl fmt::Display for RawChartPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RawChartPayload {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSummary {
    pub solar_date: Option<String>,
    pub lunar_date: Option<String>,
    pub five_elements_class: Option<String>,
    pub palaces: Vec<PalaceSummary>,
}

impl ChartSummary {
    pub fn star_count(&self) -> usize {
        self.palaces.iter().map(|p| p.stars.len()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PalaceSummary {
    pub name: String,
    /// Names from every star list in the palace (major, minor, adjective...).
    pub stars: Vec<String>,
}

impl PalaceSummary {
    fn from_value(palace: &Value) -> Self {
        let name = palace
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let stars = palace
            .as_object()
            .into_iter()
            .flat_map(|fields| fields.values())
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(|item| item.get("name").and_then(Value::as_str))
            .map(str::to_owned)
            .collect();

        Self { name, stars }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_collects_palaces_and_stars() {
        let payload = RawChartPayload::new(
            r#"{
                "solarDate": "1990-5-1",
                "fiveElementsClass": "木三局",
                "palaces": [
                    {"name": "命宫", "majorStars": [{"name": "紫微"}, {"name": "天府"}],
                     "minorStars": [{"name": "文昌"}], "ages": [1, 13]},
                    {"name": "兄弟", "majorStars": []}
                ]
            }"#,
        );

        let summary = payload.summary().unwrap();
        assert_eq!(summary.solar_date.as_deref(), Some("1990-5-1"));
        assert_eq!(summary.lunar_date, None);
        assert_eq!(summary.palaces.len(), 2);
        assert_eq!(summary.palaces[0].name, "命宫");
        assert_eq!(summary.palaces[0].stars.len(), 3);
        assert!(summary.palaces[0].stars.contains(&"文昌".to_string()));
        assert!(summary.palaces[1].stars.is_empty());
        assert_eq!(summary.star_count(), 3);
    }

    #[test]
    fn summary_of_chart_without_palaces_is_empty() {
        let summary = RawChartPayload::new("{}").summary().unwrap();
        assert_eq!(summary, ChartSummary::default());
    }

    #[test]
    fn summary_rejects_non_json() {
        assert!(RawChartPayload::new("<html>").summary().is_err());
    }
}
