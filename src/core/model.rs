// dataprofiler - core/model.rs
//
// Core data model types (spec §3). Pure data definitions, no I/O.
// These are the shared vocabulary flowing between the pipeline,
// app-layer orchestration, and the CLI's serialization boundary.

use crate::core::candidate_key::CandidateKey;
use crate::core::errors::ErrorRollupEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Run
// =============================================================================

/// Lifecycle state of a profiling run (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Queued,
    Processing,
    Completed,
    Failed,
}

/// Immutable configuration a run is created with (spec §6 "Consumed").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub delimiter: char,
    pub quoting_enabled: bool,
    /// Informational only; normalization always targets LF regardless.
    pub expected_line_ending: Option<String>,
    pub null_tokens: Vec<String>,
    pub auto_detect_delimiter: bool,
    pub spill_budget_bytes: u64,
    pub top_k: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quoting_enabled: true,
            expected_line_ending: None,
            null_tokens: vec![String::new()],
            auto_detect_delimiter: false,
            spill_budget_bytes: crate::util::constants::DEFAULT_SPILL_BUDGET_BYTES,
            top_k: crate::util::constants::DEFAULT_TOP_K,
        }
    }
}

/// Identifies and tracks a single profiling execution.
#[derive(Debug, Clone, Serialize)]
pub struct Run {
    pub run_id: String,
    pub config: RunConfig,
    pub state: RunState,
    /// Monotonic progress fraction in [0, 1].
    pub progress: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Run {
    pub fn new(run_id: impl Into<String>, config: RunConfig, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id: run_id.into(),
            config,
            state: RunState::Queued,
            progress: 0.0,
            started_at,
            finished_at: None,
        }
    }
}

// =============================================================================
// ColumnDescriptor
// =============================================================================

/// Static column identity as read from the header (spec §3).
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDescriptor {
    pub ordinal: usize,
    pub name: String,
    pub inferred_type: crate::core::types::ColumnType,
}

// =============================================================================
// Column summary (serialized slice of ProfilerState, spec §4.7/§6)
// =============================================================================

/// A single column's complete, stream-final summary, ready for
/// serialization into the profile artifact's `columns[]`.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub ordinal: usize,
    pub name: String,
    pub inferred_type: crate::core::types::ColumnType,
    pub row_count: u64,
    pub null_count: u64,
    pub nonnull_count: u64,
    pub null_pct: f64,
    pub distinct_count: usize,
    pub length_min: Option<usize>,
    pub length_max: Option<usize>,
    pub length_avg: Option<f64>,
    pub numeric_min: Option<f64>,
    pub numeric_max: Option<f64>,
    pub numeric_mean: Option<f64>,
    pub numeric_stddev: Option<f64>,
    pub median: Option<String>,
    pub date_min: Option<String>,
    pub date_max: Option<String>,
    pub top_k: Vec<TopValue>,
    pub sanitization_notes: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopValue {
    pub value: String,
    pub count: u64,
}

// =============================================================================
// File metadata (spec §6 `file{...}`)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FileMetadata {
    pub rows: u64,
    pub columns: usize,
    pub delimiter: char,
    pub crlf_observed: u64,
    pub lf_observed: u64,
    pub cr_observed: u64,
    pub byte_size: u64,
    pub sha256: String,
    pub bom: bool,
}

// =============================================================================
// Profile artifact (spec §6 "Produced")
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProfileArtifact {
    pub run_id: String,
    pub file: FileMetadata,
    pub errors: Vec<ErrorRollupEntry>,
    pub warnings: Vec<ErrorRollupEntry>,
    pub columns: Vec<ColumnSummary>,
    pub candidate_keys: Vec<CandidateKey>,
}

// =============================================================================
// Metrics row stream (spec §6)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MetricsRow {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: crate::core::types::ColumnType,
    pub row_count: u64,
    pub null_count: u64,
    pub null_pct: f64,
    pub distinct_count: usize,
    pub min: Option<String>,
    pub max: Option<String>,
    pub mean: Option<f64>,
    pub median: Option<String>,
    pub stddev: Option<f64>,
}

// =============================================================================
// Audit record (spec §6, "no raw values")
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub input_sha256: String,
    pub byte_count: u64,
    pub row_count: u64,
    pub column_count: usize,
    pub delimiter: char,
    pub utf8_valid: bool,
    pub processing_time_ms: u64,
    pub errors_by_code: std::collections::BTreeMap<String, u64>,
}

// =============================================================================
// Pipeline progress (internal, analogous to a scan-progress channel)
// =============================================================================

/// Progress/lifecycle messages emitted by the pipeline to an external
/// collaborator (spec §4.5 "Progress reporting", §5 cancellation).
#[derive(Debug, Clone)]
pub enum RunProgress {
    Started,
    HeaderBound { columns: usize },
    Tick { fraction: f64, rows_seen: u64 },
    Completed { artifact: Box<ProfileArtifact> },
    Failed { reason: String },
    Cancelled,
}
