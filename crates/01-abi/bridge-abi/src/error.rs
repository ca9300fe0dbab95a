//! Failure taxonomy for the boundary.
//!
//! Every failure crosses the boundary as data, an error-bearing
//! [`ByteBuffer`](crate::ByteBuffer), never as an unwind or a native
//! exception. The caller cannot distinguish a domain error from a
//! contained fault except by reading the diagnostic; both arrive the same
//! way.

use std::any::Any;
use thiserror::Error;

/// Convenience alias for bridge-level results.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failures that can surface before or while running the compute routine.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The routine reported a domain error for this input.
    #[error("routine error: {0}")]
    Routine(anyhow::Error),

    /// The routine terminated abnormally; the fault was contained on this
    /// side of the boundary.
    #[error("routine panicked: {0}")]
    Panicked(String),

    /// No compute routine has been installed in this process.
    #[error("no routine installed")]
    NoRoutine,
}

/// Renders a caught panic payload into a diagnostic string.
///
/// Payloads are `&str` or `String` in practice; anything else is reported
/// as opaque rather than dropped.
pub fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_owned()
    }
}
