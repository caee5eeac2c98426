//! UTF-8 marshaling across the boundary
//!
//! Outbound strings are encoded into a NUL-terminated buffer that lives exactly
//! as long as the call that consumes it. Inbound strings are copied out
//! immediately; the host's buffer is never retained.

use std::ffi::{c_char, CStr};

/// Largest payload (in bytes, excluding the terminator) kept on the stack.
pub const INLINE_CAPACITY: usize = 511;

enum Utf8Buffer {
    Inline([u8; INLINE_CAPACITY + 1]),
    Heap(Vec<u8>),
}

impl Utf8Buffer {
    fn encode(text: &str) -> Self {
        let bytes = text.as_bytes();
        if bytes.len() <= INLINE_CAPACITY {
            let mut buf = [0u8; INLINE_CAPACITY + 1];
            buf[..bytes.len()].copy_from_slice(bytes);
            Utf8Buffer::Inline(buf)
        } else {
            let mut buf = Vec::with_capacity(bytes.len() + 1);
            buf.extend_from_slice(bytes);
            buf.push(0);
            Utf8Buffer::Heap(buf)
        }
    }

    fn as_ptr(&self) -> *const c_char {
        match self {
            Utf8Buffer::Inline(buf) => buf.as_ptr().cast(),
            Utf8Buffer::Heap(buf) => buf.as_ptr().cast(),
        }
    }

    #[cfg(test)]
    fn is_inline(&self) -> bool {
        matches!(self, Utf8Buffer::Inline(_))
    }
}

/// Run `f` with a NUL-terminated UTF-8 copy of `text`.
///
/// Returns `None` without calling `f` when `text` is empty. The pointer is only
/// valid inside `f`. Interior NUL bytes truncate the string as seen by C.
pub fn with_native_utf8<R>(text: &str, f: impl FnOnce(*const c_char) -> R) -> Option<R> {
    if text.is_empty() {
        return None;
    }
    let buffer = Utf8Buffer::encode(text);
    Some(f(buffer.as_ptr()))
}

/// Copy a NUL-terminated UTF-8 string owned by the host.
///
/// Null yields `None`. Invalid sequences are replaced with U+FFFD.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated buffer valid for reads for
/// the duration of this call.
pub unsafe fn native_utf8_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let text = unsafe { CStr::from_ptr(ptr) };
    Some(text.to_string_lossy().into_owned())
}
