//! Error types.
//!
//! Library operations return [`PipelineError`]; the `crashes` binary converts
//! those into an [`AppError`] that also carries the process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to remove a stale cache file during a forced refresh.
///
/// This one is recoverable: the fetcher keeps the stale file and reports the
/// failure alongside a successful outcome.
#[derive(Debug, Error)]
#[error("failed to evict cached file '{}': {}", .path.display(), .source)]
pub struct CacheEvictionError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Transport failure or non-success response while downloading.
    #[error("failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    #[error(transparent)]
    CacheEviction(#[from] CacheEvictionError),

    /// The downloaded body could not be persisted to the cache path.
    #[error("failed to write cache file '{}': {}", .path.display(), .source)]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// One or more required columns are absent from the header row.
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("line {line}: invalid timestamp '{value}' in `{column}` (expected {expected})")]
    TimestampParse {
        line: u64,
        column: String,
        value: String,
        expected: &'static str,
    },

    /// A measure cell is present but is not a finite, non-negative number.
    #[error("line {line}: invalid value '{value}' in `{column}`")]
    InvalidMeasure {
        line: u64,
        column: String,
        value: String,
    },
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Fetch { .. }
            | PipelineError::CacheEviction(_)
            | PipelineError::CacheWrite { .. } => 4,
            PipelineError::Read { .. }
            | PipelineError::Csv(_)
            | PipelineError::Schema { .. }
            | PipelineError::TimestampParse { .. }
            | PipelineError::InvalidMeasure { .. } => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
