//! Owned byte region handed across the host boundary.
//!
//! The descriptor is the unit of ownership transfer: before it is returned,
//! the allocation belongs to this side; once handed over, the receiver owns
//! it and must pass the exact descriptor back to the release entry point,
//! once. The unsafe surface stays inside this module: construction
//! disassembles a live `Vec`, release reassembles it at a single point.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::{mem, ptr, slice};

/// Result descriptor exchanged across the boundary.
///
/// Layout (C view): `{ data: *mut u8, len: usize, cap: usize, err: *const char }`.
/// Exactly one of the payload and the error indicator is meaningful: a
/// successful call carries an owned byte region and a null `err`; a failed
/// call carries an empty region and an owned NUL-terminated diagnostic.
/// The type is move-only: no `Clone`, and the only way out is
/// the consuming [`release`](ByteBuffer::release).
#[repr(C)]
#[derive(Debug)]
pub struct ByteBuffer {
    data: *mut u8,
    len: usize,
    cap: usize,
    err: *const c_char,
}

// SAFETY: the descriptor exclusively owns the allocations its pointers
// refer to; no shared state is reachable through them, so moving the
// descriptor to another thread moves ownership with it.
unsafe impl Send for ByteBuffer {}

impl From<Vec<u8>> for ByteBuffer {
    fn from(mut payload: Vec<u8>) -> Self {
        let buffer = Self {
            data: payload.as_mut_ptr(),
            len: payload.len(),
            cap: payload.capacity(),
            err: ptr::null(),
        };
        mem::forget(payload);
        log::trace!("buffer created: {buffer:?}");
        buffer
    }
}

impl<E: ToString> From<Result<Vec<u8>, E>> for ByteBuffer {
    fn from(result: Result<Vec<u8>, E>) -> Self {
        match result {
            Ok(payload) => Self::from(payload),
            Err(err) => Self::from_error(err),
        }
    }
}

impl ByteBuffer {
    /// Builds an error-bearing descriptor with an empty payload.
    ///
    /// The error path itself must not fail, so the diagnostic is coerced
    /// into C-string shape: interior NUL bytes are replaced and an empty
    /// message is substituted with a placeholder.
    pub fn from_error<E: ToString>(err: E) -> Self {
        let mut message = err.to_string();
        if message.is_empty() {
            message.push_str("unspecified error");
        }
        let message = message.replace('\0', "\u{fffd}");
        let diagnostic = CString::new(message).expect("NUL bytes replaced above");
        let buffer = Self {
            data: ptr::null_mut(),
            len: 0,
            cap: 0,
            err: diagnostic.into_raw(),
        };
        log::trace!("error buffer created: {buffer:?}");
        buffer
    }

    /// Number of valid payload bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total allocated payload bytes (`cap >= len`).
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns true when the descriptor carries an error indicator.
    ///
    /// An error-bearing descriptor's payload must not be interpreted as a
    /// result, even though both fields are structurally present.
    pub fn has_error(&self) -> bool {
        !self.err.is_null()
    }

    /// Views the payload bytes. Empty for the error-only shape.
    pub fn as_slice(&self) -> &[u8] {
        if self.data.is_null() || self.len == 0 {
            return &[];
        }
        // SAFETY: a non-null `data` with non-zero `len` was produced by
        // `From<Vec<u8>>` from a live vector, and the allocation stays owned
        // by this descriptor until `release`.
        unsafe { slice::from_raw_parts(self.data, self.len) }
    }

    /// Copies out the diagnostic carried by an error descriptor.
    pub fn error_message(&self) -> Option<String> {
        if self.err.is_null() {
            return None;
        }
        // SAFETY: a non-null `err` always points at the NUL-terminated
        // string allocated by `from_error` and owned by this descriptor.
        let message = unsafe { CStr::from_ptr(self.err) };
        Some(message.to_string_lossy().into_owned())
    }

    /// Consumes the descriptor and frees whatever it owns.
    ///
    /// The payload is reconstructed and dropped only when the descriptor
    /// actually owns an allocation (`cap != 0`); the empty and error-only
    /// shapes carry a null or dangling pointer that must never reach the
    /// allocator. The diagnostic string is freed independently under the
    /// same rule.
    pub fn release(self) {
        log::trace!("buffer released: {self:?}");
        let Self {
            data,
            len,
            cap,
            err,
        } = self;

        if cap != 0 && !data.is_null() {
            // SAFETY: a non-zero capacity is only ever set by
            // `From<Vec<u8>>`, which disassembled exactly this
            // (ptr, len, cap) triple from a live Vec and forgot it.
            // Reassembling restores unique ownership; the Vec drops here.
            drop(unsafe { Vec::from_raw_parts(data, len, cap) });
        }
        if !err.is_null() {
            // SAFETY: a non-null `err` is only ever produced by
            // `CString::into_raw` in `from_error`; taking it back returns
            // ownership to a CString dropped here.
            drop(unsafe { CString::from_raw(err as *mut c_char) });
        }
    }
}
