#![deny(unsafe_op_in_unsafe_fn)]
//! C-compatible boundary surface of the call bridge.
//!
//! Exactly three entry points cross the boundary, plus the two value types
//! from `bridge-abi` they exchange:
//! * [`bridge_call`] – synchronous, blocking; returns a descriptor.
//! * [`bridge_call_async`] – non-blocking; copies the input, schedules the
//!   routine on a worker, and delivers the outcome through the callback
//!   exactly once.
//! * [`bridge_release`] – consumes a descriptor previously produced here
//!   and frees whatever it owns.
//!
//! There is no versioning field and no handshake; caller and callee agree
//! on this exact shape at build time. Routine wiring stays on the Rust
//! side; see [`install_routine`].

mod registry;

pub use bridge_abi::{ByteBuffer, CompletionCallback, Routine, RoutineHandle};
pub use registry::{clear_routine, install_routine};

use bridge_abi::BridgeError;
use bridge_executor::{deliver_error, run_routine, run_routine_async};
use std::slice;

/// Borrows the caller's input span for the duration of a call.
///
/// # Safety
/// `data` must point at `len` readable bytes, valid for the caller-chosen
/// lifetime `'a`. A null pointer or zero length yields the empty span.
unsafe fn borrow_input<'a>(data: *const u8, len: usize) -> &'a [u8] {
    if data.is_null() || len == 0 {
        return &[];
    }
    // SAFETY: non-null `data` with `len` readable bytes per the caller
    // contract above.
    unsafe { slice::from_raw_parts(data, len) }
}

/// Synchronous call: runs the installed routine on the caller's thread.
///
/// The returned descriptor carries either the routine's output bytes or a
/// diagnostic string; a routine fault is contained here and converted to
/// the error shape, never propagated as an unwind. The caller must hand the
/// descriptor to [`bridge_release`] exactly once and must not touch the
/// region afterwards.
///
/// # Safety
/// `data` must point at `len` readable bytes that stay valid and unmutated
/// for the duration of this call; the bridge does not retain the span past
/// return.
#[no_mangle]
pub unsafe extern "C" fn bridge_call(data: *const u8, len: usize) -> ByteBuffer {
    // SAFETY: forwarded caller contract.
    let input = unsafe { borrow_input(data, len) };
    match registry::routine() {
        Some(routine) => run_routine(routine.as_ref(), input),
        None => ByteBuffer::from_error(BridgeError::NoRoutine),
    }
}

/// Asynchronous call: returns before the routine runs.
///
/// The input span is copied before this function returns (copy-on-submit),
/// so the caller may reuse or free its buffer immediately afterwards. The
/// completion fires exactly once, from a worker thread, with the same two
/// outcome shapes as [`bridge_call`], including when no routine is
/// installed or the routine faults.
///
/// # Safety
/// `data` must point at `len` readable bytes until this function returns.
/// `completion.notify` must be callable from an arbitrary thread, and
/// `completion.user_data` must stay valid until the callback has fired.
#[no_mangle]
pub unsafe extern "C" fn bridge_call_async(
    data: *const u8,
    len: usize,
    completion: CompletionCallback,
) {
    // SAFETY: forwarded caller contract; the copy below ends the borrow.
    let input = unsafe { borrow_input(data, len) }.to_vec();
    match registry::routine() {
        Some(routine) => run_routine_async(registry::executor(), routine, input, completion),
        None => deliver_error(registry::executor(), completion, BridgeError::NoRoutine),
    }
}

/// Consumes a descriptor previously produced by this library and frees
/// whatever it owns. Infallible.
///
/// # Safety
/// `buffer` must be a descriptor obtained from [`bridge_call`] or a
/// completion callback, released at most once. After this call the byte
/// region and diagnostic string are invalid for everyone; double release
/// or fabricated descriptors are undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn bridge_release(buffer: ByteBuffer) {
    buffer.release();
}
