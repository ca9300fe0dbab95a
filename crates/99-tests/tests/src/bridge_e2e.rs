//! End-to-end scenarios over the boundary surface.

use crate::harness::{call, call_async, release, with_routine};
use mock::{CallOutcome, CompletionProbe, CountingRoutine, EchoRoutine};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn identity_round_trip_over_various_sizes() {
    with_routine(Arc::new(EchoRoutine), || {
        for size in [0usize, 1, 7, 256, 64 * 1024] {
            let payload: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let buffer = call(&payload);

            assert!(!buffer.has_error(), "size {size}: unexpected error");
            assert_eq!(buffer.as_slice(), payload.as_slice(), "size {size}");
            assert!(buffer.capacity() >= buffer.len());
            release(buffer);
        }
    });
}

#[test]
fn outcome_shapes_are_mutually_exclusive() {
    // First byte selects the outcome: 0 echoes, 1 reports a domain error,
    // anything else faults.
    let routine: bridge_ffi::RoutineHandle = Arc::new(|input: &[u8]| -> anyhow::Result<Vec<u8>> {
        match input.first() {
            None | Some(0) => Ok(input.to_vec()),
            Some(1) => anyhow::bail!("unsupported request kind"),
            Some(_) => panic!("unexpected request kind"),
        }
    });

    with_routine(routine, || {
        let buffer = call(&[0, 10, 20]);
        assert!(!buffer.has_error());
        assert_eq!(buffer.error_message(), None);
        assert_eq!(buffer.as_slice(), &[0, 10, 20]);
        release(buffer);

        let buffer = call(&[1]);
        assert!(buffer.has_error());
        assert!(buffer.is_empty(), "error payload must be empty");
        let message = buffer.error_message().expect("diagnostic present");
        assert!(!message.is_empty(), "diagnostic must be non-empty");
        release(buffer);

        let buffer = call(&[2]);
        assert!(buffer.has_error(), "fault arrives as an error descriptor");
        release(buffer);

        // The boundary survived a contained fault: the success path still
        // works within the same process.
        let buffer = call(&[0, 99]);
        assert_eq!(buffer.as_slice(), &[0, 99]);
        release(buffer);
    });
}

#[test]
fn async_outcome_is_equivalent_to_sync() {
    with_routine(Arc::new(EchoRoutine), || {
        let payload = b"equivalence".to_vec();

        let sync_buffer = call(&payload);
        let sync_payload = sync_buffer.as_slice().to_vec();
        let sync_error = sync_buffer.error_message();
        release(sync_buffer);

        let probe = CompletionProbe::new();
        call_async(&payload, probe.callback());
        let outcome = probe.wait(WAIT).expect("async call completes");

        match (outcome, sync_error) {
            (CallOutcome::Payload(bytes), None) => assert_eq!(bytes, sync_payload),
            (CallOutcome::Error(message), Some(expected)) => assert_eq!(message, expected),
            (got, expected) => panic!("outcome mismatch: async {got:?} vs sync {expected:?}"),
        }
    });
}

#[test]
fn every_submission_reaches_the_routine_once() {
    let (routine, calls) = CountingRoutine::with_counter();
    with_routine(Arc::new(routine), || {
        const SYNC_CALLS: usize = 8;
        const ASYNC_CALLS: usize = 24;

        for _ in 0..SYNC_CALLS {
            release(call(b"sync"));
        }

        let probe = CompletionProbe::new();
        for _ in 0..ASYNC_CALLS {
            call_async(b"async", probe.callback());
        }
        for _ in 0..ASYNC_CALLS {
            probe.wait(WAIT).expect("async call completes");
        }

        assert_eq!(
            calls.load(std::sync::atomic::Ordering::SeqCst),
            SYNC_CALLS + ASYNC_CALLS,
            "each submission runs the routine exactly once"
        );
        assert_eq!(probe.delivered(), ASYNC_CALLS);
    });
}

#[test]
fn released_buffers_do_not_corrupt_later_traffic() {
    with_routine(Arc::new(EchoRoutine), || {
        // Interleave produce/release cycles with held descriptors.
        let held: Vec<_> = (0..4u8)
            .map(|i| {
                let buffer = call(&[i; 16]);
                release(call(&[0xAA; 32]));
                buffer
            })
            .collect();

        for (i, buffer) in held.into_iter().enumerate() {
            assert_eq!(
                buffer.as_slice(),
                &[i as u8; 16],
                "held descriptor {i} unaffected by unrelated releases"
            );
            release(buffer);
        }
    });
}
