// dataprofiler - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "dataprofiler";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Byte source / gzip
// =============================================================================

/// Magic bytes that identify a gzip stream (RFC 1952).
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Default read chunk size in bytes for streaming file reads.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB

// =============================================================================
// UTF-8 / BOM
// =============================================================================

/// UTF-8 byte-order mark.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Highest valid Unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

// =============================================================================
// Delimiter detection (§4.4)
// =============================================================================

/// Bound on the prefix sampled for delimiter auto-detection.
pub const DELIMITER_DETECTION_PREFIX_BYTES: usize = 64 * 1024; // 64 KiB

/// Confidence above which a detected delimiter disagreeing with the
/// configured one is worth a mismatch warning.
pub const DELIMITER_MISMATCH_CONFIDENCE_THRESHOLD: f64 = 0.7;

// =============================================================================
// Type inference (§4.6)
// =============================================================================

/// Fraction of non-null values a type candidate may fail to match before
/// the candidate flag is permanently cleared.
pub const TYPE_VIOLATION_TOLERANCE: f64 = 0.05;

/// Minimum non-null sample size before code-type classification is attempted.
pub const CODE_DETECTION_MIN_SAMPLES: usize = 100;

/// Maximum distinct values for a column to be eligible for code classification.
pub const CODE_DETECTION_MAX_DISTINCT: usize = 100;

/// Maximum distinct/non-null ratio for code classification.
pub const CODE_DETECTION_MAX_RATIO: f64 = 0.01;

/// Varchar/alpha boundary: strings longer than this are `Varchar`, at most
/// this are `Alpha`.
pub const ALPHA_MAX_LENGTH: usize = 255;

// =============================================================================
// Column profiling (§4.7)
// =============================================================================

/// Default number of heavy hitters tracked per column.
pub const DEFAULT_TOP_K: usize = 10;

/// Bounded in-memory top-K candidate map size before a spill to the
/// distinct store is required to compute exact top-K.
pub const TOP_K_CANDIDATE_MAP_CAPACITY: usize = 1024;

// =============================================================================
// Distinct store (§4.8)
// =============================================================================

/// Default per-column in-memory distinct value cap ("M" in spec.md §4.8)
/// before further inserts spill to the on-disk store.
pub const DEFAULT_DISTINCT_SPILL_THRESHOLD: usize = 1_000_000;

/// Default on-disk spill budget in bytes before `E_SPILL_DIRECTORY_FULL`.
pub const DEFAULT_SPILL_BUDGET_BYTES: u64 = 8 * 1024 * 1024 * 1024; // 8 GiB

/// Fraction of the spill budget at which `W_SPILL_DIRECTORY_NEARING_FULL`
/// is raised.
pub const SPILL_NEARING_FULL_RATIO: f64 = 0.9;

/// Width, in bytes, of the strong hash used to key compound tuples
/// (§4.8 `compound_hash_count`, "a strong hash (>= 128 bits)").
pub const COMPOUND_HASH_BYTES: usize = 32; // SHA-256

// =============================================================================
// Candidate-key engine (§4.9)
// =============================================================================

/// Minimum distinct ratio for a single-column candidate key.
pub const SINGLE_KEY_MIN_DISTINCT_RATIO: f64 = 0.95;

/// Maximum null ratio for a single-column candidate key.
pub const SINGLE_KEY_MAX_NULL_RATIO: f64 = 0.05;

/// Minimum distinct ratio for a column to participate in a compound candidate.
pub const COMPOUND_KEY_MIN_DISTINCT_RATIO: f64 = 0.7;

/// Maximum null ratio for a column to participate in a compound candidate.
pub const COMPOUND_KEY_MAX_NULL_RATIO: f64 = 0.10;

/// Minimum compound distinctness ratio to retain a compound candidate.
pub const COMPOUND_KEY_MIN_TUPLE_RATIO: f64 = 0.995;

/// Largest compound-key arity considered (2 and 3 column combinations).
pub const COMPOUND_KEY_MAX_ARITY: usize = 3;

/// Number of candidate keys returned after scoring and ranking.
pub const MAX_CANDIDATE_KEYS_RETURNED: usize = 10;

// =============================================================================
// Error aggregator (§4.10)
// =============================================================================

/// Maximum number of sample values retained per error code ("S" in §4.10).
pub const DEFAULT_ERROR_SAMPLE_CAP: usize = 10;

// =============================================================================
// Concurrency & cancellation (§5)
// =============================================================================

/// Upper bound on the number of rows processed between cancellation checks.
pub const CANCEL_CHECK_ROW_INTERVAL: u64 = 10_000;

/// Upper bound on bytes consumed between cancellation checks.
pub const CANCEL_CHECK_BYTE_INTERVAL: u64 = 64 * 1024; // 64 KiB

/// Maximum progress ticks emitted per second (§4.5 "not more than 20 times
/// per second").
pub const MAX_PROGRESS_TICKS_PER_SECOND: u32 = 20;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
