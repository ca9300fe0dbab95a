//! Worker pool and dispatch paths for the call bridge.
//!
//! The synchronous path runs the routine to completion on the caller's
//! thread; the asynchronous path hands an owned copy of the input to a
//! fixed pool of worker threads and delivers the outcome through a
//! one-shot callback. Both paths contain routine panics and fold every
//! outcome into the two descriptor shapes defined by `bridge-abi`; an
//! unwind never crosses out of this crate.

mod dispatch;
mod pool;

pub use dispatch::{deliver_error, run_routine, run_routine_async};
pub use pool::{Executor, ExecutorConfig};
