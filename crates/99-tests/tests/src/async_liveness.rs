//! Liveness and exactly-once properties of the asynchronous path.

use crate::harness::{call_async, with_routine};
use bridge_ffi::{ByteBuffer, CompletionCallback};
use crossbeam_channel::{unbounded, Sender};
use mock::{CallOutcome, CompletionProbe, EchoRoutine, SlowEchoRoutine};
use std::os::raw::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

/// Callback context that records which thread delivered the completion.
struct DeliveryCapture {
    deliveries: Sender<ThreadId>,
    count: AtomicUsize,
}

extern "C" fn capture_delivery(ctx: *const c_void, buffer: ByteBuffer) {
    // SAFETY: `ctx` is the address of a `DeliveryCapture` owned by the test
    // and kept alive until the delivery channel has been drained.
    let capture = unsafe { &*(ctx as *const DeliveryCapture) };
    capture.count.fetch_add(1, Ordering::SeqCst);
    buffer.release();
    let _ = capture.deliveries.send(thread::current().id());
}

#[test]
fn callback_runs_off_the_submitting_thread() {
    with_routine(Arc::new(EchoRoutine), || {
        let (deliveries, delivered) = unbounded();
        let capture = Box::new(DeliveryCapture {
            deliveries,
            count: AtomicUsize::new(0),
        });
        let callback = CompletionCallback::new(
            capture.as_ref() as *const DeliveryCapture as *const c_void,
            capture_delivery,
        );

        let payload = b"thread check".to_vec();
        call_async(&payload, callback);

        let delivery_thread = delivered.recv_timeout(WAIT).expect("completion delivered");
        assert_ne!(
            delivery_thread,
            thread::current().id(),
            "completion must not run on the submitting thread"
        );
        assert_eq!(capture.count.load(Ordering::SeqCst), 1);
    });
}

#[test]
fn concurrent_submitters_all_complete_exactly_once() {
    const SUBMITTERS: usize = 4;
    const CALLS_PER_SUBMITTER: usize = 8;

    with_routine(Arc::new(EchoRoutine), || {
        let probe = CompletionProbe::new();

        thread::scope(|scope| {
            for submitter in 0..SUBMITTERS {
                let probe = &probe;
                scope.spawn(move || {
                    for call_idx in 0..CALLS_PER_SUBMITTER {
                        let payload = vec![submitter as u8, call_idx as u8];
                        call_async(&payload, probe.callback());
                    }
                });
            }
        });

        let total = SUBMITTERS * CALLS_PER_SUBMITTER;
        let mut seen = Vec::with_capacity(total);
        for _ in 0..total {
            match probe.wait(WAIT).expect("every submission completes") {
                CallOutcome::Payload(payload) => seen.push((payload[0], payload[1])),
                CallOutcome::Error(message) => panic!("unexpected error: {message}"),
            }
        }
        seen.sort_unstable();

        let mut expected = Vec::with_capacity(total);
        for submitter in 0..SUBMITTERS as u8 {
            for call_idx in 0..CALLS_PER_SUBMITTER as u8 {
                expected.push((submitter, call_idx));
            }
        }
        assert_eq!(seen, expected, "no completion lost, none duplicated");
        assert_eq!(probe.delivered(), total);
    });
}

#[test]
fn submission_returns_before_the_routine_completes() {
    let delay = Duration::from_millis(200);
    with_routine(Arc::new(SlowEchoRoutine::new(delay)), || {
        let probe = CompletionProbe::new();
        let payload = b"slow".to_vec();

        let submitted_at = std::time::Instant::now();
        call_async(&payload, probe.callback());
        let submit_latency = submitted_at.elapsed();

        assert!(
            submit_latency < delay,
            "submission must not block on the routine (took {submit_latency:?})"
        );

        let outcome = probe.wait(WAIT).expect("slow call still completes");
        assert_eq!(outcome, CallOutcome::Payload(b"slow".to_vec()));
    });
}
