//! Error types for the telemetry engine.

use thiserror::Error;

/// Errors raised by a [`crate::store::VariableStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named slot does not exist in the store
    #[error("unknown variable slot: {0}")]
    UnknownSlot(String),

    /// The slot holds a value of a different type
    #[error("type mismatch for slot {slot}: expected {expected}")]
    TypeMismatch {
        slot: String,
        expected: &'static str,
    },
}

/// Errors raised by the simulation loop controller.
#[derive(Debug, Error)]
pub enum CellError {
    /// `start()` was called while a tick loop is already active
    #[error("simulation loop already running")]
    AlreadyRunning,

    /// A store slot needed at start was missing or mistyped
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by the prediction requester.
///
/// Transport and parse failures are kept distinct so callers can tell a
/// dead endpoint from a malformed reply. Neither overwrites previously
/// published prediction fields.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The HTTP request failed (connect, timeout, non-success transfer)
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON shape
    #[error("invalid inference response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Reading the snapshot or publishing the verdict failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
