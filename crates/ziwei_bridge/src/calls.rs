//! Script call expressions
//!
//! The calculation payload travels as an escaped JSON string literal; lookup
//! arguments are plain numeric literals.

use ziwei_core::{escape_single_quoted, CalculationRequest, EscapeStyle, LookupKind};

pub const CALCULATE_FUNCTION: &str = "calculateAstrolabe";

/// `calculateAstrolabe('<escaped json>')`
pub fn calculate_call(
    request: &CalculationRequest,
    style: EscapeStyle,
) -> serde_json::Result<String> {
    let json = request.to_json()?;
    Ok(format!(
        "{CALCULATE_FUNCTION}('{}')",
        escape_single_quoted(&json, style)
    ))
}

/// One lookup against the state of the last calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupQuery {
    Decadal { age: u32 },
    Yearly { year: i32 },
    Monthly { year: i32, month: u32 },
    Daily { year: i32, month: u32, day: u32 },
}

impl LookupQuery {
    pub fn kind(&self) -> LookupKind {
        match self {
            LookupQuery::Decadal { .. } => LookupKind::Decadal,
            LookupQuery::Yearly { .. } => LookupKind::Yearly,
            LookupQuery::Monthly { .. } => LookupKind::Monthly,
            LookupQuery::Daily { .. } => LookupKind::Daily,
        }
    }

    pub fn expression(&self) -> String {
        let function = self.kind().function_name();
        match *self {
            LookupQuery::Decadal { age } => format!("{function}({age})"),
            LookupQuery::Yearly { year } => format!("{function}({year})"),
            LookupQuery::Monthly { year, month } => format!("{function}({year}, {month})"),
            LookupQuery::Daily { year, month, day } => {
                format!("{function}({year}, {month}, {day})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ziwei_core::unescape_single_quoted;

    #[test]
    fn lookup_expressions_embed_numeric_literals() {
        assert_eq!(LookupQuery::Decadal { age: 30 }.expression(), "getDecadalData(30)");
        assert_eq!(LookupQuery::Yearly { year: 2024 }.expression(), "getYearlyData(2024)");
        assert_eq!(
            LookupQuery::Monthly { year: 2024, month: 3 }.expression(),
            "getMonthlyData(2024, 3)"
        );
        assert_eq!(
            LookupQuery::Daily { year: 2024, month: 3, day: 9 }.expression(),
            "getDailyData(2024, 3, 9)"
        );
    }

    #[test]
    fn calculate_call_wraps_escaped_json() {
        let request = CalculationRequest::new(1990, 5, 1, 10, 30, "male", false);
        let call = calculate_call(&request, EscapeStyle::Quotes).unwrap();

        assert!(call.starts_with("calculateAstrolabe('{\\\"year\\\":1990"));
        assert!(call.ends_with("')"));

        let literal = &call["calculateAstrolabe('".len()..call.len() - 2];
        let json = unescape_single_quoted(literal).unwrap();
        let decoded: CalculationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn hostile_gender_survives_both_styles() {
        let request = CalculationRequest::new(1984, 2, 29, 0, 0, "it's a \"\\n\" \\ \n test\r", true);
        for style in [EscapeStyle::Quotes, EscapeStyle::QuotesAndLineBreaks] {
            let call = calculate_call(&request, style).unwrap();
            let literal = &call["calculateAstrolabe('".len()..call.len() - 2];
            let json = unescape_single_quoted(literal).unwrap();
            let decoded: CalculationRequest = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, request, "style {style:?}");
        }
    }
}
