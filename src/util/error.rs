// dataprofiler - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. All errors preserve the causal
// chain for diagnostic logging.
//
// This hierarchy covers host/config/IO failures that abort a run before
// or outside of data profiling proper. Data-quality issues observed
// *during* profiling (malformed rows, bad UTF-8, type violations, ...)
// are a separate taxonomy: see `core::errors::ErrorEvent`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all dataprofiler operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ProfilerError {
    /// Byte source / gzip decompression failed.
    ByteSource(ByteSourceError),

    /// Run configuration is invalid.
    Config(ConfigError),

    /// The distinct store (spill tier) failed.
    DistinctStore(DistinctStoreError),

    /// The run itself was aborted (catastrophic data error or cancellation).
    Run(RunError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ProfilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByteSource(e) => write!(f, "byte source error: {e}"),
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::DistinctStore(e) => write!(f, "distinct store error: {e}"),
            Self::Run(e) => write!(f, "run error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ProfilerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ByteSource(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::DistinctStore(e) => Some(e),
            Self::Run(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Byte source errors (§4.1)
// ---------------------------------------------------------------------------

/// Errors related to reading and decompressing the input file.
#[derive(Debug)]
pub enum ByteSourceError {
    /// The underlying file could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The gzip stream could not be decoded (catastrophic `E_CODEC`).
    GzipDecode { path: PathBuf, source: io::Error },
}

impl fmt::Display for ByteSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "I/O error reading '{}': {source}", path.display())
            }
            Self::GzipDecode { path, source } => {
                write!(f, "gzip decode error in '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ByteSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::GzipDecode { source, .. } => Some(source),
        }
    }
}

impl From<ByteSourceError> for ProfilerError {
    fn from(e: ByteSourceError) -> Self {
        Self::ByteSource(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to run configuration loading/validation.
#[derive(Debug)]
pub enum ConfigError {
    /// JSON parsing failed.
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading the config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonParse { path, source } => {
                write!(f, "config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::JsonParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ProfilerError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Distinct store errors (§4.8)
// ---------------------------------------------------------------------------

/// Errors related to the spillable distinct-value store.
#[derive(Debug)]
pub enum DistinctStoreError {
    /// The on-disk SQLite backing store could not be opened or written.
    Sqlite {
        path: PathBuf,
        source: rusqlite::Error,
    },

    /// The configured spill budget was exceeded (catastrophic
    /// `E_SPILL_DIRECTORY_FULL`).
    BudgetExceeded { used_bytes: u64, budget_bytes: u64 },
}

impl fmt::Display for DistinctStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite { path, source } => {
                write!(f, "spill store error '{}': {source}", path.display())
            }
            Self::BudgetExceeded {
                used_bytes,
                budget_bytes,
            } => write!(
                f,
                "spill directory usage {used_bytes} bytes exceeds budget of {budget_bytes} bytes"
            ),
        }
    }
}

impl std::error::Error for DistinctStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sqlite { source, .. } => Some(source),
            Self::BudgetExceeded { .. } => None,
        }
    }
}

impl From<DistinctStoreError> for ProfilerError {
    fn from(e: DistinctStoreError) -> Self {
        Self::DistinctStore(e)
    }
}

// ---------------------------------------------------------------------------
// Run errors (§3, §5)
// ---------------------------------------------------------------------------

/// Reasons a run did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// A catastrophic error event halted the pipeline; the profile is not
    /// a complete artifact.
    Catastrophic { code: &'static str },

    /// The run was cancelled cooperatively (§5).
    Cancelled,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catastrophic { code } => write!(f, "catastrophic error {code}; run failed"),
            Self::Cancelled => write!(f, "run cancelled"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<RunError> for ProfilerError {
    fn from(e: RunError) -> Self {
        Self::Run(e)
    }
}

/// Convenience type alias for dataprofiler results.
pub type Result<T> = std::result::Result<T, ProfilerError>;
