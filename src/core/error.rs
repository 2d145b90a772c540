//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by fair queue components.
///
/// Contract violations (unregistering a class with pending work, normalizing
/// against a zero-dimension axis, queueing on an unregistered class) are
/// deliberately *not* represented here: those are caller bugs and the core
/// panics rather than returning a recoverable error.
#[derive(Debug, Error)]
pub enum FairQueueError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
