//! Mock routines and completion probes for exercising the bridge.
//!
//! The routines here stand in for the opaque compute routine: one echoes,
//! one rejects, one panics, one stalls. [`CompletionProbe`] is the host
//! side of the callback contract in miniature: it records deliveries and
//! releases every descriptor it receives.

use anyhow::bail;
use bridge_abi::{ByteBuffer, CompletionCallback, Routine};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::os::raw::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Echoes the request payload back unchanged.
pub struct EchoRoutine;

impl Routine for EchoRoutine {
    fn run(&self, input: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(input.to_vec())
    }
}

/// Rejects every request with the configured diagnostic.
pub struct RejectingRoutine {
    message: String,
}

impl RejectingRoutine {
    /// Creates a routine that fails with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Routine for RejectingRoutine {
    fn run(&self, _input: &[u8]) -> anyhow::Result<Vec<u8>> {
        bail!("{}", self.message)
    }
}

/// Panics on every request, exercising fault containment.
pub struct PanickingRoutine;

impl Routine for PanickingRoutine {
    fn run(&self, _input: &[u8]) -> anyhow::Result<Vec<u8>> {
        panic!("mock routine fault")
    }
}

/// Sleeps before echoing, for scheduling and copy-on-submit tests.
pub struct SlowEchoRoutine {
    delay: Duration,
}

impl SlowEchoRoutine {
    /// Creates an echo routine that stalls for `delay` first.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Routine for SlowEchoRoutine {
    fn run(&self, input: &[u8]) -> anyhow::Result<Vec<u8>> {
        std::thread::sleep(self.delay);
        Ok(input.to_vec())
    }
}

/// Echoes while counting invocations through a shared counter.
pub struct CountingRoutine {
    calls: Arc<AtomicUsize>,
}

impl CountingRoutine {
    /// Creates the routine and returns it with its call counter.
    pub fn with_counter() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl Routine for CountingRoutine {
    fn run(&self, input: &[u8]) -> anyhow::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(input.to_vec())
    }
}

/// Outcome extracted from a delivered descriptor.
///
/// The probe releases the descriptor inside the callback, so tests only
/// ever see owned copies of the payload or diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallOutcome {
    /// Successful result payload.
    Payload(Vec<u8>),
    /// Diagnostic carried by an error descriptor.
    Error(String),
}

/// Host-side capture point for completion callbacks.
///
/// Boxed so its address stays stable for the lifetime of the contract; the
/// probe must outlive every callback built from it.
pub struct CompletionProbe {
    delivered: AtomicUsize,
    outcomes: Sender<CallOutcome>,
    received: Receiver<CallOutcome>,
}

impl CompletionProbe {
    /// Creates a pinned probe.
    pub fn new() -> Box<Self> {
        let (outcomes, received) = unbounded();
        Box::new(Self {
            delivered: AtomicUsize::new(0),
            outcomes,
            received,
        })
    }

    /// Builds a boundary callback pointing at this probe.
    ///
    /// Each contract delivers once; a probe may hand out several contracts
    /// and collect their outcomes in arrival order.
    pub fn callback(&self) -> CompletionCallback {
        CompletionCallback::new(self as *const Self as *const c_void, record_completion)
    }

    /// Waits for the next delivered outcome.
    pub fn wait(&self, timeout: Duration) -> Option<CallOutcome> {
        self.received.recv_timeout(timeout).ok()
    }

    /// Number of callbacks delivered so far.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

extern "C" fn record_completion(ctx: *const c_void, buffer: ByteBuffer) {
    // SAFETY: `ctx` is the probe address handed out by `callback`, and the
    // probe outlives delivery per its contract.
    let probe = unsafe { &*(ctx as *const CompletionProbe) };
    probe.delivered.fetch_add(1, Ordering::SeqCst);
    let outcome = match buffer.error_message() {
        Some(message) => CallOutcome::Error(message),
        None => CallOutcome::Payload(buffer.as_slice().to_vec()),
    };
    buffer.release();
    let _ = probe.outcomes.send(outcome);
}
