// dataprofiler - core/errors.rs
//
// The error-event taxonomy and aggregator (spec §4.10, §7). This is
// distinct from `util::error::ProfilerError`: that hierarchy models
// unrecoverable host/config failures; this module models *data-quality*
// events observed while streaming a file, which are counted and rolled
// up rather than propagated as Rust `Result` errors.
//
// Core layer: pure logic, no I/O.

use serde::Serialize;
use std::collections::HashMap;

/// Severity of a recorded error event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Halts processing; the run transitions to `failed`.
    Catastrophic,
    /// Counted and reported; processing continues.
    Error,
    /// Informational signal; processing continues.
    Warning,
}

/// Fixed mapping from taxonomy code to severity (spec §7). The only
/// legitimate process-wide mutable-looking state in the core is this
/// table, and it is immutable after compilation.
pub fn severity_of(code: &str) -> Severity {
    match code {
        "E_UTF8_INVALID"
        | "E_HEADER_MISSING"
        | "E_HEADER_EMPTY"
        | "E_JAGGED_ROW"
        | "E_SPILL_DIRECTORY_FULL"
        | "E_CODEC"
        | "E_IO" => Severity::Catastrophic,

        "E_QUOTE_RULE_VIOLATION"
        | "E_UNQUOTED_DELIMITER"
        | "E_UNQUOTED_NEWLINE"
        | "E_NUMERIC_FORMAT"
        | "E_MONEY_FORMAT"
        | "E_DATE_INVALID"
        | "E_DATE_MIXED_FORMAT"
        | "E_MIXED_TYPE"
        | "E_TYPE_UNKNOWN"
        | "E_HEADER_DUPLICATE"
        | "E_ROW_EMPTY"
        | "E_KEY_INVALID" => Severity::Error,

        "W_LINE_ENDING_INCONSISTENT"
        | "W_DATE_RANGE"
        | "W_KEY_LOW_CARDINALITY"
        | "W_DUPLICATE_FOUND"
        | "W_SPILL_DIRECTORY_NEARING_FULL"
        | "W_DELIMITER_MISMATCH" => Severity::Warning,

        // Informational, non-taxonomy codes (e.g. BOM_STRIPPED) are
        // treated as warnings: they never halt the pipeline.
        _ => Severity::Warning,
    }
}

/// Fixed user-readable message template for a code.
pub fn message_template(code: &str) -> &'static str {
    match code {
        "E_UTF8_INVALID" => "input is not well-formed UTF-8",
        "E_HEADER_MISSING" => "no header row found before end of input",
        "E_HEADER_EMPTY" => "header row has zero fields",
        "E_JAGGED_ROW" => "row field count does not match the header arity",
        "E_SPILL_DIRECTORY_FULL" => "distinct-value spill directory exceeded its budget",
        "E_CODEC" => "input could not be decompressed",
        "E_IO" => "I/O error reading input",
        "E_QUOTE_RULE_VIOLATION" => "malformed quoted field",
        "E_UNQUOTED_DELIMITER" => "delimiter encountered where a field value was expected",
        "E_UNQUOTED_NEWLINE" => "newline encountered inside an unquoted field",
        "E_NUMERIC_FORMAT" => "value does not match the strict numeric format",
        "E_MONEY_FORMAT" => "value does not match the strict money format",
        "E_DATE_INVALID" => "value is not a calendar-valid date",
        "E_DATE_MIXED_FORMAT" => "column contains more than one date format",
        "E_MIXED_TYPE" => "column does not conform to a single type",
        "E_TYPE_UNKNOWN" => "column type could not be determined",
        "E_HEADER_DUPLICATE" => "duplicate column name in header",
        "E_ROW_EMPTY" => "row contained zero bytes and was skipped",
        "E_KEY_INVALID" => "candidate key could not be verified",
        "W_LINE_ENDING_INCONSISTENT" => "more than one line-ending style observed",
        "W_DATE_RANGE" => "date falls outside the plausible calendar range",
        "W_KEY_LOW_CARDINALITY" => "candidate key has low cardinality",
        "W_DUPLICATE_FOUND" => "duplicate rows found for a confirmed key",
        "W_SPILL_DIRECTORY_NEARING_FULL" => "distinct-value spill directory nearing its budget",
        "W_DELIMITER_MISMATCH" => "configured delimiter disagrees with the detected delimiter",
        "BOM_STRIPPED" => "leading byte-order mark was stripped",
        "INFINITY_SANITIZED" => "a non-finite statistic was sanitized for serialization",
        _ => "unrecognized event",
    }
}

/// Context attached to a single error event (§7 "optional context block").
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorContext {
    pub row_number: Option<u64>,
    pub column_ordinal: Option<usize>,
    pub byte_offset: Option<u64>,
}

/// A single typed error event raised by any pipeline stage.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub code: &'static str,
    pub severity: Severity,
    pub context: ErrorContext,
    /// Sample value, subject to the aggregator's per-code sample cap.
    /// Never a full raw row; always a single field's worth of bytes.
    pub sample: Option<String>,
    pub message: &'static str,
}

impl ErrorEvent {
    pub fn new(code: &'static str) -> Self {
        Self {
            code,
            severity: severity_of(code),
            context: ErrorContext::default(),
            sample: None,
            message: message_template(code),
        }
    }

    pub fn with_row(mut self, row_number: u64) -> Self {
        self.context.row_number = Some(row_number);
        self
    }

    pub fn with_column(mut self, column_ordinal: usize) -> Self {
        self.context.column_ordinal = Some(column_ordinal);
        self
    }

    pub fn with_byte_offset(mut self, offset: u64) -> Self {
        self.context.byte_offset = Some(offset);
        self
    }

    pub fn with_sample(mut self, sample: impl Into<String>) -> Self {
        self.sample = Some(sample.into());
        self
    }
}

/// Roll-up entry for a single error code.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRollupEntry {
    pub code: &'static str,
    pub severity: Severity,
    pub count: u64,
    pub samples: Vec<String>,
    pub message: &'static str,
}

/// The complete roll-up produced at the end of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorRollup {
    pub entries: Vec<ErrorRollupEntry>,
}

/// Thread-confined collector of `ErrorEvent`s (§4.10).
///
/// One aggregator per run; it is owned by the run and all pipeline
/// stages borrow a handle to it (per spec §9 "no cyclic references").
/// It is not `Sync`-shared across runs — each run has its own.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    sample_cap: usize,
    counts: HashMap<&'static str, u64>,
    samples: HashMap<&'static str, Vec<String>>,
    first_seen_order: Vec<&'static str>,
    catastrophic: bool,
}

impl ErrorAggregator {
    pub fn new(sample_cap: usize) -> Self {
        Self {
            sample_cap,
            ..Default::default()
        }
    }

    /// Record an event. O(1) amortized.
    pub fn record(&mut self, event: ErrorEvent) {
        if !self.counts.contains_key(event.code) {
            self.first_seen_order.push(event.code);
            tracing::warn!(code = event.code, severity = ?event.severity, "first occurrence of event code");
        }
        *self.counts.entry(event.code).or_insert(0) += 1;

        if let Some(sample) = event.sample {
            let bucket = self.samples.entry(event.code).or_default();
            if bucket.len() < self.sample_cap {
                bucket.push(sample);
            }
        }

        if event.severity == Severity::Catastrophic {
            if !self.catastrophic {
                tracing::error!(code = event.code, "catastrophic event recorded; halting run");
            }
            self.catastrophic = true;
        }
    }

    /// True iff any catastrophic code has count > 0.
    pub fn has_catastrophic(&self) -> bool {
        self.catastrophic
    }

    pub fn count_of(&self, code: &str) -> u64 {
        self.counts.get(code).copied().unwrap_or(0)
    }

    /// Produce the roll-up in first-seen order.
    pub fn rollup(&self) -> ErrorRollup {
        let entries = self
            .first_seen_order
            .iter()
            .map(|&code| ErrorRollupEntry {
                code,
                severity: severity_of(code),
                count: self.counts.get(code).copied().unwrap_or(0),
                samples: self.samples.get(code).cloned().unwrap_or_default(),
                message: message_template(code),
            })
            .collect();
        ErrorRollup { entries }
    }
}
