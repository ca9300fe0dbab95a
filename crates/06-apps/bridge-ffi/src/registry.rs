//! Process-global routine slot and worker pool.
//!
//! The ABI surface carries no handshake, so the compute routine reaches the
//! bridge through Rust-side linkage: the embedding build installs it before
//! the host starts issuing calls. The slot is swappable at runtime; the
//! worker pool is created lazily on the first asynchronous call and lives
//! for the rest of the process.

use arc_swap::ArcSwapOption;
use bridge_abi::RoutineHandle;
use bridge_executor::{Executor, ExecutorConfig};
use once_cell::sync::Lazy;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Sized cell kept behind the swap slot; `Arc<dyn Routine>` itself is a fat
/// pointer, which the lock-free slot cannot hold directly.
struct Slot {
    routine: RoutineHandle,
}

static ROUTINE: ArcSwapOption<Slot> = ArcSwapOption::const_empty();

static EXECUTOR: Lazy<Executor> = Lazy::new(|| {
    let config = config_from_env();
    log::debug!("starting bridge executor: {config:?}");
    Executor::new(config)
});

/// Installs the process-wide compute routine, replacing any previous one.
///
/// In-flight calls keep the routine they already resolved; the swap only
/// affects calls submitted afterwards.
pub fn install_routine(routine: RoutineHandle) {
    log::debug!("routine installed");
    ROUTINE.store(Some(Arc::new(Slot { routine })));
}

/// Removes the installed routine.
///
/// Subsequent calls produce the "no routine installed" error descriptor.
pub fn clear_routine() {
    log::debug!("routine cleared");
    ROUTINE.store(None);
}

pub(crate) fn routine() -> Option<RoutineHandle> {
    ROUTINE.load_full().map(|slot| Arc::clone(&slot.routine))
}

pub(crate) fn executor() -> &'static Executor {
    &EXECUTOR
}

fn config_from_env() -> ExecutorConfig {
    let mut config = ExecutorConfig::default();
    if let Ok(raw) = std::env::var("BRIDGE_WORKERS") {
        match raw.parse::<NonZeroUsize>() {
            Ok(workers) => config.workers = workers,
            Err(_) => log::warn!("ignoring invalid BRIDGE_WORKERS value {raw:?}"),
        }
    }
    config
}
