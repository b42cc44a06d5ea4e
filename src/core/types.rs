// dataprofiler - core/types.rs
//
// Type inference & validators (spec §4.6). Runs per value as it
// streams, no separate sample pass. Strict format checks for numeric
// and money are plain byte scans rather than the `regex` crate: the
// patterns are fixed, anchored, and simple enough that a hand-written
// scanner is both faster and avoids compiling a pattern per column.
// Date parsing uses `chrono` for calendar validity.

use crate::core::errors::ErrorEvent;
use crate::util::constants::{
    ALPHA_MAX_LENGTH, CODE_DETECTION_MAX_DISTINCT, CODE_DETECTION_MAX_RATIO,
    CODE_DETECTION_MIN_SAMPLES, TYPE_VIOLATION_TOLERANCE,
};
use chrono::{Datelike, NaiveDate};

/// Final inferred column type (spec §3 `ColumnDescriptor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Alpha,
    Varchar,
    Code,
    Numeric,
    Money,
    Date,
    Mixed,
    Unknown,
}

/// Canonical date formats in detection priority order (spec §4.6).
const DATE_FORMATS: &[(&str, &str)] = &[
    ("YYYYMMDD", "%Y%m%d"),
    ("YYYY-MM-DD", "%Y-%m-%d"),
    ("MM/DD/YYYY", "%m/%d/%Y"),
    ("DD/MM/YYYY", "%d/%m/%Y"),
    ("YYYY/MM/DD", "%Y/%m/%d"),
    ("DD-MMM-YYYY", "%d-%b-%Y"),
);

/// Strict numeric validator: `^[0-9]+(\.[0-9]+)?$`.
pub fn is_strict_numeric(value: &[u8]) -> bool {
    let mut parts = value.splitn(2, |&b| b == b'.');
    let int_part = parts.next().unwrap_or(b"");
    if int_part.is_empty() || !int_part.iter().all(u8::is_ascii_digit) {
        return false;
    }
    match parts.next() {
        None => parts.next().is_none(),
        Some(frac) => !frac.is_empty() && frac.iter().all(u8::is_ascii_digit),
    }
}

/// Strict money validator: `^[0-9]+\.[0-9]{2}$`.
pub fn is_strict_money(value: &[u8]) -> bool {
    let dot = match value.iter().position(|&b| b == b'.') {
        Some(i) => i,
        None => return false,
    };
    let (int_part, rest) = value.split_at(dot);
    let frac = &rest[1..];
    !int_part.is_empty()
        && int_part.iter().all(u8::is_ascii_digit)
        && frac.len() == 2
        && frac.iter().all(u8::is_ascii_digit)
}

/// Try every canonical format in priority order, returning the first
/// that parses along with its calendar validity.
fn try_parse_date(value: &str) -> Option<(&'static str, Option<NaiveDate>)> {
    for (name, fmt) in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some((name, Some(date)));
        }
    }
    // A value that matches a format's shape but fails calendar validity
    // (e.g. 2024-02-30) still pins the format; chrono's parse fails for
    // such values outright, so we separately probe shape-only matches.
    for (name, fmt) in DATE_FORMATS {
        if shape_matches(value, fmt) {
            return Some((name, None));
        }
    }
    None
}

/// Coarse shape check (digit/separator positions) used only to decide
/// whether a calendar-invalid value still pins a format, per spec:
/// "Calendar-invalid dates ... emit E_DATE_INVALID and are excluded"
/// (they still count toward the pinned format, not as a format miss).
fn shape_matches(value: &str, fmt: &str) -> bool {
    let expected_len = match fmt {
        "%Y%m%d" => 8,
        "%Y-%m-%d" | "%Y/%m/%d" => 10,
        "%m/%d/%Y" | "%d/%m/%Y" => 10,
        "%d-%b-%Y" => return value.len() >= 10 && value.len() <= 11,
        _ => return false,
    };
    value.chars().count() == expected_len
}

/// Per-column type-candidate flags (spec §4.6), with violation tallies
/// used to apply the 5% tolerance rule.
#[derive(Debug, Clone)]
pub struct TypeCandidates {
    pub can_be_numeric: bool,
    pub can_be_money: bool,
    pub can_be_date: bool,
    pub can_be_code: bool,
    pub can_be_alpha: bool,

    numeric_violations: u64,
    money_violations: u64,
    date_violations: u64,

    nonnull_count: u64,
    max_length: usize,

    pinned_date_format: Option<&'static str>,
    date_format_counts: std::collections::HashMap<&'static str, u64>,
    date_min: Option<NaiveDate>,
    date_max: Option<NaiveDate>,

    distinct_hint: u64,
}

impl Default for TypeCandidates {
    fn default() -> Self {
        Self {
            can_be_numeric: true,
            can_be_money: true,
            can_be_date: true,
            can_be_code: true,
            can_be_alpha: true,
            numeric_violations: 0,
            money_violations: 0,
            date_violations: 0,
            nonnull_count: 0,
            max_length: 0,
            pinned_date_format: None,
            date_format_counts: std::collections::HashMap::new(),
            date_min: None,
            date_max: None,
            distinct_hint: 0,
        }
    }
}

impl TypeCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one non-null value, returning any events it raised.
    pub fn observe(
        &mut self,
        value: &[u8],
        row_number: u64,
        column_ordinal: usize,
        current_year: i32,
    ) -> Vec<ErrorEvent> {
        let mut events = Vec::new();
        self.nonnull_count += 1;
        self.max_length = self.max_length.max(value.len());

        if self.can_be_numeric {
            if is_strict_numeric(value) {
                // numeric implies no-op; money is checked separately
            } else {
                self.numeric_violations += 1;
                if self.exceeds_tolerance(self.numeric_violations) {
                    self.can_be_numeric = false;
                }
                events.push(
                    ErrorEvent::new("E_NUMERIC_FORMAT")
                        .with_row(row_number)
                        .with_column(column_ordinal)
                        .with_sample(String::from_utf8_lossy(value).into_owned()),
                );
            }
        }

        if self.can_be_money {
            if is_strict_money(value) {
                // ok
            } else {
                self.money_violations += 1;
                if self.exceeds_tolerance(self.money_violations) {
                    self.can_be_money = false;
                }
                events.push(
                    ErrorEvent::new("E_MONEY_FORMAT")
                        .with_row(row_number)
                        .with_column(column_ordinal)
                        .with_sample(String::from_utf8_lossy(value).into_owned()),
                );
            }
        }

        if self.can_be_date {
            events.extend(self.observe_date(value, row_number, column_ordinal, current_year));
        }

        if self.can_be_alpha && !value.iter().all(u8::is_ascii_alphabetic) {
            self.can_be_alpha = false;
        }

        events
    }

    // Allowance is a ceiling, not a raw fraction, so one stray violation
    // on a small sample doesn't immediately exceed a sub-1 tolerance.
    fn exceeds_tolerance(&self, violations: u64) -> bool {
        let allowance = (TYPE_VIOLATION_TOLERANCE * self.nonnull_count as f64).ceil() as u64;
        violations > allowance
    }

    fn observe_date(
        &mut self,
        value: &[u8],
        row_number: u64,
        column_ordinal: usize,
        current_year: i32,
    ) -> Vec<ErrorEvent> {
        let mut events = Vec::new();
        let text = match std::str::from_utf8(value) {
            Ok(s) => s,
            Err(_) => {
                self.date_violations += 1;
                if self.exceeds_tolerance(self.date_violations) {
                    self.can_be_date = false;
                }
                return events;
            }
        };

        match try_parse_date(text) {
            Some((format, Some(date))) => {
                if self.pinned_date_format.is_none() {
                    self.pinned_date_format = Some(format);
                }
                *self.date_format_counts.entry(format).or_insert(0) += 1;

                if date.year() < 1900 || date.year() > current_year + 1 {
                    events.push(
                        ErrorEvent::new("W_DATE_RANGE")
                            .with_row(row_number)
                            .with_column(column_ordinal)
                            .with_sample(text.to_string()),
                    );
                }
                self.date_min = Some(self.date_min.map_or(date, |m| m.min(date)));
                self.date_max = Some(self.date_max.map_or(date, |m| m.max(date)));

                if self.mixed_format_threshold_exceeded() {
                    events.push(ErrorEvent::new("E_DATE_MIXED_FORMAT").with_column(column_ordinal));
                }
            }
            Some((_, None)) => {
                self.date_violations += 1;
                if self.exceeds_tolerance(self.date_violations) {
                    self.can_be_date = false;
                }
                events.push(
                    ErrorEvent::new("E_DATE_INVALID")
                        .with_row(row_number)
                        .with_column(column_ordinal)
                        .with_sample(text.to_string()),
                );
            }
            None => {
                self.date_violations += 1;
                if self.exceeds_tolerance(self.date_violations) {
                    self.can_be_date = false;
                }
                events.push(
                    ErrorEvent::new("E_DATE_INVALID")
                        .with_row(row_number)
                        .with_column(column_ordinal)
                        .with_sample(text.to_string()),
                );
            }
        }
        events
    }

    fn mixed_format_threshold_exceeded(&self) -> bool {
        if self.nonnull_count == 0 {
            return false;
        }
        let qualifying = self
            .date_format_counts
            .values()
            .filter(|&&count| count as f64 / self.nonnull_count as f64 > TYPE_VIOLATION_TOLERANCE)
            .count();
        qualifying >= 2
    }

    /// Record a hint of distinct-value cardinality for code detection
    /// (the profiler supplies this from its distinct tracker).
    pub fn note_distinct_hint(&mut self, distinct_count: u64) {
        self.distinct_hint = distinct_count;
    }

    fn is_code(&self) -> bool {
        self.nonnull_count >= CODE_DETECTION_MIN_SAMPLES as u64
            && self.distinct_hint <= CODE_DETECTION_MAX_DISTINCT as u64
            && (self.distinct_hint as f64 / self.nonnull_count.max(1) as f64) < CODE_DETECTION_MAX_RATIO
    }

    /// Final type resolution at end of stream (spec §4.6).
    pub fn resolve(&self) -> ColumnType {
        if self.nonnull_count == 0 {
            return ColumnType::Unknown;
        }
        if self.can_be_money {
            ColumnType::Money
        } else if self.can_be_numeric {
            ColumnType::Numeric
        } else if self.can_be_date && self.pinned_date_format.is_some() {
            ColumnType::Date
        } else if self.is_code() {
            ColumnType::Code
        } else if self.can_be_alpha {
            if self.max_length > ALPHA_MAX_LENGTH {
                ColumnType::Varchar
            } else {
                ColumnType::Alpha
            }
        } else {
            let surviving = [self.can_be_numeric, self.can_be_money, self.can_be_date]
                .iter()
                .filter(|&&c| c)
                .count();
            if surviving > 1 {
                ColumnType::Mixed
            } else {
                ColumnType::Unknown
            }
        }
    }

    pub fn date_min(&self) -> Option<NaiveDate> {
        self.date_min
    }

    pub fn date_max(&self) -> Option<NaiveDate> {
        self.date_max
    }

    pub fn pinned_date_format(&self) -> Option<&'static str> {
        self.pinned_date_format
    }
}

/// Null recognition (spec §4.6): empty after quote stripping, or a
/// configured null token (case-sensitive match).
pub fn is_null(value: &[u8], null_tokens: &[Vec<u8>]) -> bool {
    value.is_empty() || null_tokens.iter().any(|t| t == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_validator_accepts_and_rejects() {
        assert!(is_strict_numeric(b"123"));
        assert!(is_strict_numeric(b"123.45"));
        assert!(!is_strict_numeric(b"-123"));
        assert!(!is_strict_numeric(b"1e10"));
        assert!(!is_strict_numeric(b"1,000"));
        assert!(!is_strict_numeric(b""));
        assert!(!is_strict_numeric(b"123."));
    }

    #[test]
    fn money_validator_requires_exactly_two_fraction_digits() {
        assert!(is_strict_money(b"10.00"));
        assert!(!is_strict_money(b"10.0"));
        assert!(!is_strict_money(b"10"));
        assert!(!is_strict_money(b"$10.00"));
        assert!(!is_strict_money(b"10.000"));
    }

    #[test]
    fn null_recognition_matches_empty_and_configured_tokens() {
        let tokens = vec![b"NULL".to_vec()];
        assert!(is_null(b"", &tokens));
        assert!(is_null(b"NULL", &tokens));
        assert!(!is_null(b"null", &tokens));
        assert!(!is_null(b"x", &tokens));
    }

    #[test]
    fn pure_numeric_column_resolves_numeric() {
        let mut tc = TypeCandidates::new();
        for v in [b"1".as_slice(), b"22", b"333"] {
            tc.observe(v, 1, 0, 2026);
        }
        assert_eq!(tc.resolve(), ColumnType::Numeric);
    }

    #[test]
    fn pure_money_column_resolves_money() {
        let mut tc = TypeCandidates::new();
        for v in [b"1.00".as_slice(), b"2.50", b"3.99"] {
            tc.observe(v, 1, 0, 2026);
        }
        assert_eq!(tc.resolve(), ColumnType::Money);
    }

    #[test]
    fn iso_date_column_resolves_date() {
        let mut tc = TypeCandidates::new();
        for v in [b"2024-01-01".as_slice(), b"2024-06-15"] {
            tc.observe(v, 1, 0, 2026);
        }
        assert_eq!(tc.resolve(), ColumnType::Date);
        assert_eq!(tc.pinned_date_format(), Some("YYYY-MM-DD"));
    }

    #[test]
    fn calendar_invalid_date_raises_event_and_excludes_from_range() {
        let mut tc = TypeCandidates::new();
        let events = tc.observe(b"2024-02-30", 1, 0, 2026);
        assert!(events.iter().any(|e| e.code == "E_DATE_INVALID"));
        assert!(tc.date_min().is_none());
    }

    #[test]
    fn out_of_range_year_raises_warning_but_counts() {
        let mut tc = TypeCandidates::new();
        let events = tc.observe(b"1850-01-01", 1, 0, 2026);
        assert!(events.iter().any(|e| e.code == "W_DATE_RANGE"));
        assert!(tc.date_min().is_some());
    }

    #[test]
    fn alpha_column_with_short_values_resolves_alpha() {
        let mut tc = TypeCandidates::new();
        for v in [b"abc".as_slice(), b"def", b"ghi"] {
            tc.observe(v, 1, 0, 2026);
        }
        assert_eq!(tc.resolve(), ColumnType::Alpha);
    }

    #[test]
    fn code_detection_requires_min_samples_and_low_ratio() {
        let mut tc = TypeCandidates::new();
        for _ in 0..150 {
            tc.observe(b"CODE", 1, 0, 2026);
        }
        tc.note_distinct_hint(1);
        assert_eq!(tc.resolve(), ColumnType::Code);
    }
}
