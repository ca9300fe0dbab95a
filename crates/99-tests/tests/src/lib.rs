//! Test suite for the call bridge.

#[cfg(test)]
mod bridge_e2e;

#[cfg(test)]
mod async_liveness;
