//! Outcome folding for the synchronous and asynchronous call paths.

use crate::Executor;
use bridge_abi::{panic_message, BridgeError, ByteBuffer, CompletionCallback, Routine};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Runs the routine to completion on the current thread and folds the
/// outcome into a descriptor.
///
/// This is the failure-containment point of the synchronous path: a panic
/// inside the routine is caught here and surfaces as an error-bearing
/// descriptor. Nothing unwinds past this function.
pub fn run_routine(routine: &dyn Routine, input: &[u8]) -> ByteBuffer {
    log::debug!(
        "sync call ({} bytes) on {:?}",
        input.len(),
        thread::current().name().unwrap_or("<unnamed>")
    );
    ByteBuffer::from(run_contained(routine, input))
}

/// Schedules the routine on the executor and delivers the outcome through
/// the callback, exactly once, on a worker thread.
///
/// The input is owned by the job from this point on (copy-on-submit
/// happened at the boundary), so the caller's span obligations have
/// already ended.
pub fn run_routine_async(
    executor: &Executor,
    routine: Arc<dyn Routine>,
    input: Vec<u8>,
    completion: CompletionCallback,
) {
    executor.submit(move || {
        log::debug!(
            "async call ({} bytes) on {:?}",
            input.len(),
            thread::current().name().unwrap_or("<unnamed>")
        );
        let buffer = ByteBuffer::from(run_contained(routine.as_ref(), &input));
        completion.invoke(buffer);
    });
}

/// Delivers a bridge-level failure through the callback on a worker
/// thread, preserving the exactly-once contract for calls that never
/// reached a routine.
pub fn deliver_error(executor: &Executor, completion: CompletionCallback, error: BridgeError) {
    executor.submit(move || completion.invoke(ByteBuffer::from_error(error)));
}

fn run_contained(routine: &dyn Routine, input: &[u8]) -> Result<Vec<u8>, BridgeError> {
    match panic::catch_unwind(AssertUnwindSafe(|| routine.run(input))) {
        Ok(Ok(payload)) => Ok(payload),
        Ok(Err(err)) => Err(BridgeError::Routine(err)),
        Err(payload) => {
            let message = panic_message(payload);
            log::error!("routine fault contained at boundary: {message}");
            Err(BridgeError::Panicked(message))
        }
    }
}
