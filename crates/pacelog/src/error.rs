//! Emitter construction errors.
//!
//! Emitting itself never fails; only building an emitter can.

use pacelog_core::SettingsError;
use thiserror::Error;

/// Error type for emitter construction.
#[derive(Debug, Error)]
pub enum EmitterError {
    /// No tokio runtime was supplied and none is running on this thread.
    #[error("No tokio runtime available to schedule deferred flushes")]
    NoRuntime,

    /// The supplied settings failed validation.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
