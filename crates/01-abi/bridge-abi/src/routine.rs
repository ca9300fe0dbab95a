//! Seam for the compute routine behind the bridge.

use std::sync::Arc;

/// The opaque compute routine the bridge exposes to the host.
///
/// The bridge is payload-agnostic: a routine consumes request bytes and
/// produces response bytes or a domain error; framing and encoding are the
/// collaborators' business. Implementations run on the caller's thread for
/// synchronous calls and on worker threads for asynchronous ones, possibly
/// concurrently.
pub trait Routine: Send + Sync {
    /// Runs the routine over the borrowed input span.
    ///
    /// The span is valid only for the duration of the call and must not be
    /// retained.
    fn run(&self, input: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// Shared handle to an installed routine.
pub type RoutineHandle = Arc<dyn Routine>;

impl<F> Routine for F
where
    F: Fn(&[u8]) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn run(&self, input: &[u8]) -> anyhow::Result<Vec<u8>> {
        self(input)
    }
}
