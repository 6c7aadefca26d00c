//! Pipeline errors

use crate::io::IoError;
use thiserror::Error;

/// Every way the re-tiling pipeline can fail.
///
/// Each stage validates its own output and the first failure aborts the
/// run; nothing is retried and no partial output is produced.
#[derive(Debug, Error)]
pub enum GridError {
    /// Input grid dimensions are unusable (a representative cell needs at least 2×2).
    #[error("invalid grid size {x}x{y}: {reason}")]
    InvalidGridSize {
        x: usize,
        y: usize,
        reason: &'static str,
    },

    /// A numeric option is out of range (non-positive radius, height, or cell size).
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A mesh had no vertices where geometry was required.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The placement plan produced no pieces (a zero grid dimension).
    #[error("assembly produced no pieces: {0}")]
    EmptyAssembly(String),

    /// The boolean engine returned an empty or unusable result.
    #[error("boolean {operation} produced no geometry")]
    BooleanOperationFailure { operation: &'static str },

    /// A mesh failed a validation checkpoint (NaN coordinates, infinite extent, bad indices).
    #[error("mesh validation failed at `{checkpoint}`: {reason}")]
    MeshValidation { checkpoint: String, reason: String },

    /// Reading or writing an interchange format failed.
    #[error(transparent)]
    Io(#[from] IoError),

    /// The blocking worker running the pipeline panicked or was cancelled.
    #[cfg(feature = "async")]
    #[error("pipeline task failed: {0}")]
    Join(String),
}

impl GridError {
    pub(crate) fn validation(checkpoint: &str, reason: impl Into<String>) -> Self {
        GridError::MeshValidation {
            checkpoint: checkpoint.to_owned(),
            reason: reason.into(),
        }
    }
}
