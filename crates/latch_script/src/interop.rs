//! Calling-convention check
//!
//! Lets a host check that it can call into the bridge and that the bridge can
//! call back, before it hands over any capability table.

use std::mem::size_of;

pub type InteropCallbackFn = unsafe extern "C" fn(a: i32, b: i32) -> i32;

pub const CHECK_OK: i32 = 0;
pub const CHECK_NULL_PAYLOAD: i32 = -1;
pub const CHECK_PAYLOAD_TOO_SMALL: i32 = -2;
pub const CHECK_NULL_CALLBACK: i32 = -3;

#[derive(Debug, Default)]
#[repr(C)]
pub struct InteropPayload {
    pub callback: Option<InteropCallbackFn>,
    pub a: i32,
    pub b: i32,
    pub result: i32,
    pub callback_hit: i32,
}

/// Call `payload.callback(a, b)` and write the result back.
///
/// # Safety
/// `payload` must be null or point to `size` writable bytes laid out as an
/// `InteropPayload`.
#[no_mangle]
pub unsafe extern "C" fn latch_script_interop_check(payload: *mut InteropPayload, size: i32) -> i32 {
    if payload.is_null() {
        return CHECK_NULL_PAYLOAD;
    }
    if usize::try_from(size).map_or(true, |size| size < size_of::<InteropPayload>()) {
        return CHECK_PAYLOAD_TOO_SMALL;
    }
    let payload = unsafe { &mut *payload };
    let Some(callback) = payload.callback else {
        return CHECK_NULL_CALLBACK;
    };

    payload.result = unsafe { callback(payload.a, payload.b) };
    payload.callback_hit = 1;
    CHECK_OK
}
