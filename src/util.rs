// Parsing, formatting and basic statistics helpers.
//
// This module centralizes the "dirty" CSV/number/date handling so the rest
// of the pipeline can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ReportError;

/// Date formats accepted in the exports. The web form submits
/// `mm/dd/YYYY`; some CRM exports use ISO dates.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%m/%d/%y"];

/// Parse a currency cell like `$1,234.56` into `f64`.
///
/// Strips the `$` sign and thousands-separator commas before parsing. A
/// residue that is not numeric is a fatal error for the owning table, so
/// the error carries the table and field names.
pub fn parse_currency(table: &str, field: &str, raw: &str) -> Result<f64, ReportError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| ReportError::InvalidCurrency {
            table: table.to_string(),
            field: field.to_string(),
            value: raw.to_string(),
        })
}

pub fn parse_date(table: &str, field: &str, raw: &str) -> Result<NaiveDate, ReportError> {
    let s = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(ReportError::InvalidDate {
        table: table.to_string(),
        field: field.to_string(),
        value: raw.to_string(),
    })
}

static SQFT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^$]\d*[,.]?\d*[,.]?\d+)\s*s?q?").expect("sqft pattern"));

/// Pull a square-footage figure out of free-form contract notes.
///
/// Every numeric token whose first character is not a `$` sign is matched,
/// commas and periods are stripped as separators, and all matches are
/// summed. Returns `None` when the text is empty or holds no numbers at
/// all, which is distinct from a recorded footage of zero.
///
/// The `[^$]` guard only keeps a `$` from opening a token, so a dollar
/// amount embedded mid-string still contributes its digits
/// ("$500 credit, 800 sq ft" comes out as 1300). This matches the
/// production exports' observed handling and is kept as-is pending
/// product-owner review.
pub fn extract_sqft(notes: &str) -> Option<f64> {
    if notes.is_empty() {
        return None;
    }
    let mut total = 0.0;
    let mut found = false;
    for caps in SQFT_RE.captures_iter(notes) {
        let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
        if let Ok(v) = digits.parse::<f64>() {
            total += v;
            found = true;
        }
    }
    found.then_some(total)
}

/// Arithmetic mean, with `None` for an empty slice.
///
/// The dashboard distinguishes "no data this period" from an average of
/// zero, so there is deliberately no zero fallback here.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Round to two decimal places, for cost-per-square-foot figures.
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Format a floating-point value with a fixed number of decimals and
/// thousands separators (`1,234,567.89`).
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let mut parts = fixed.split('.');
    let int_val: i64 = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let mut out = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        out.push('.');
        out.push_str(frac);
    }
    if n.is_sign_negative() {
        format!("-{}", out)
    } else {
        out
    }
}

/// Dollar-prefixed [`format_number`], e.g. `$1,250.00` or `$-50`.
pub fn format_currency(n: f64, decimals: usize) -> String {
    format!("${}", format_number(n, decimals))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_strips_symbols_and_separators() {
        assert_eq!(parse_currency("projects", "BID AMOUNT", "$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_currency("projects", "BID AMOUNT", "450").unwrap(), 450.0);
        assert_eq!(parse_currency("projects", "BID AMOUNT", " $2,000 ").unwrap(), 2000.0);
    }

    #[test]
    fn malformed_currency_reports_table_and_field() {
        let err = parse_currency("receivables", "INVOICE AMOUNT", "12 apples").unwrap_err();
        match err {
            ReportError::InvalidCurrency { table, field, value } => {
                assert_eq!(table, "receivables");
                assert_eq!(field, "INVOICE AMOUNT");
                assert_eq!(value, "12 apples");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(parse_currency("receivables", "INVOICE AMOUNT", "").is_err());
    }

    #[test]
    fn currency_formatting_round_trips() {
        for value in [0.0, 1.5, 99.99, 1234.56, 1_234_567.89, -50.25] {
            let text = format_currency(value, 2);
            let parsed = parse_currency("t", "f", &text).unwrap();
            assert!((parsed - value).abs() < 1e-9, "{text} -> {parsed}");
        }
    }

    #[test]
    fn number_formatting_matches_dashboard_style() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(50.0, 0), "50");
        assert_eq!(format_number(-1234.5, 0), "-1,234");
        assert_eq!(format_currency(50.0, 0), "$50");
        assert_eq!(format_currency(100.0, 2), "$100.00");
        assert_eq!(format_currency(-50.0, 0), "$-50");
    }

    #[test]
    fn date_parsing_accepts_form_and_iso_formats() {
        let expected = NaiveDate::from_ymd_opt(2016, 6, 15).unwrap();
        assert_eq!(parse_date("projects", "STATUSDATE", "06/15/2016").unwrap(), expected);
        assert_eq!(parse_date("projects", "STATUSDATE", "2016-06-15").unwrap(), expected);
        assert!(parse_date("projects", "STATUSDATE", "June 15th").is_err());
    }

    #[test]
    fn sqft_extraction_finds_marked_footage() {
        assert_eq!(extract_sqft("1,250 sq ft"), Some(1250.0));
        assert_eq!(extract_sqft("800 sq"), Some(800.0));
        assert_eq!(extract_sqft("approx 12,500 sq ft total"), Some(12500.0));
    }

    #[test]
    fn sqft_extraction_distinguishes_no_data_from_zero() {
        assert_eq!(extract_sqft(""), None);
        assert_eq!(extract_sqft("no numbers here"), None);
    }

    // Observed export-handling quirks, preserved on purpose: multiple
    // matches are summed, the `$` guard only blocks a leading `$`, and a
    // decimal point is stripped like a thousands separator.
    #[test]
    fn sqft_extraction_keeps_source_quirks() {
        assert_eq!(extract_sqft("1000 sq and 2000 sq"), Some(3000.0));
        assert_eq!(extract_sqft("$500 credit, 800 sq ft"), Some(1300.0));
        assert_eq!(extract_sqft("3.5 sq"), Some(35.0));
    }

    #[test]
    fn mean_of_empty_slice_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[100.0]), Some(100.0));
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }
}
