#![deny(unsafe_op_in_unsafe_fn)]
//! ABI-stable value types exchanged across the host boundary.
//!
//! This crate defines the pieces that actually cross between the managed
//! host and the native side, with no app-specific dependencies:
//! * [`ByteBuffer`] – an owned byte region plus optional error indicator,
//!   used as both call result and release input.
//! * [`CompletionCallback`] – the (context, function) pair that delivers an
//!   asynchronous outcome exactly once.
//! * [`Routine`] – the seam for the compute routine consuming request bytes
//!   and producing response bytes.
//! * [`BridgeError`] – the failure taxonomy folded into error descriptors
//!   at the boundary.

mod buffer;
mod callback;
mod error;
mod routine;

pub use buffer::ByteBuffer;
pub use callback::CompletionCallback;
pub use error::{panic_message, BridgeError, BridgeResult};
pub use routine::{Routine, RoutineHandle};
