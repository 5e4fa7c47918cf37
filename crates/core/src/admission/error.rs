//! Error types for admission control.

use thiserror::Error;

/// Errors returned while waiting for a download slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// The caller's cancellation scope ended before a slot was granted.
    #[error("Admission cancelled")]
    Cancelled,

    /// The gate was closed and no longer hands out slots.
    #[error("Admission gate closed")]
    Closed,
}
