//! One-shot completion contract for asynchronous calls.

use crate::ByteBuffer;
use std::os::raw::c_void;

/// The (context, function) pair delivering an asynchronous outcome.
///
/// `user_data` is opaque to the bridge: it is never dereferenced on this
/// side and is passed back verbatim so the host can correlate the
/// completion with its call site. `notify` must be safe to invoke from an
/// arbitrary worker thread; it must not assume it runs on the thread that
/// submitted the call.
///
/// Delivery is exactly-once: the dispatch paths fire every contract they
/// accept (success, domain error, and contained fault alike), and the
/// consuming [`invoke`](CompletionCallback::invoke) makes a second delivery
/// unrepresentable.
#[repr(C)]
#[derive(Debug)]
pub struct CompletionCallback {
    user_data: *const c_void,
    notify: extern "C" fn(*const c_void, ByteBuffer),
}

// SAFETY: the context pointer is carried, not dereferenced, and the
// contract obliges the host to supply a `notify` callable from any thread.
unsafe impl Send for CompletionCallback {}

impl CompletionCallback {
    /// Pairs an opaque context with its notification function.
    pub fn new(user_data: *const c_void, notify: extern "C" fn(*const c_void, ByteBuffer)) -> Self {
        Self { user_data, notify }
    }

    /// Delivers the result descriptor, consuming the contract.
    ///
    /// Ownership of the descriptor transfers to the host here; the host
    /// must eventually hand it to the release entry point.
    pub fn invoke(self, buffer: ByteBuffer) {
        log::trace!("delivering completion to ctx {:?}", self.user_data);
        (self.notify)(self.user_data, buffer)
    }
}
