//! Ziwei Core
//!
//! Value types shared by every layer of the chart bridge:
//! - Calculation requests sent into the script runtime
//! - Script-literal escaping for embedding JSON in call expressions
//! - Lookup envelopes and their typed payloads
//! - Raw chart payloads pushed back by the runtime

pub mod chart;
pub mod envelope;
pub mod escape;
pub mod lookup;
pub mod request;

pub use chart::{ChartSummary, PalaceSummary, RawChartPayload};
pub use envelope::{decode_envelope, DecodeError, LookupEnvelope};
pub use escape::{escape_single_quoted, unescape_single_quoted, EscapeStyle};
pub use lookup::{
    DailyData, DecadalData, FortuneScores, LookupKind, MonthlyData, MonthlyPalace, YearlyData,
    YearlyPalace,
};
pub use request::CalculationRequest;

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
