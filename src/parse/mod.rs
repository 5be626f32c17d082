//! Scalar parsers for loosely-formatted registry field values
//!
//! The registry renders values for humans: whitespace-padded labels,
//! European number formatting ("187.500,00 €"), day-first dates. These
//! helpers normalize that text. They are deliberately forgiving - a
//! malformed number degrades to zero and a malformed date to absent,
//! never to a failed record.

mod fields;

pub use fields::{apply_field_rules, FieldRule, FIELD_RULES};

use chrono::NaiveDate;

/// Collapses all interior whitespace runs to single spaces and trims
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a monetary or numeric field
///
/// Thousands separators ('.') are stripped and the decimal comma becomes a
/// decimal point, then the first run of digit/point characters is parsed.
/// Anything unparsable (empty cells, dashes, stray text) yields 0. Sign
/// characters never enter the scanned token, so the result is non-negative.
pub fn parse_decimal(raw: &str) -> f64 {
    let normalized: String = raw
        .chars()
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let token: String = normalized
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    token.parse::<f64>().unwrap_or(0.0)
}

/// Parses a day/month/year date with slash separators
///
/// Returns None for anything that is not exactly "dd/mm/yyyy".
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").ok()
}
