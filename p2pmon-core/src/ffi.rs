//! C ABI for linking p2pmon-core as a static library from native supplicant hosts.
//! Callbacks go in and events come out as wire frames (see `wire`).

use std::ffi::c_void;
use std::os::raw::c_int;
use std::slice;

use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::event::P2pEvent;
use crate::protocol::{Callback, CALLBACK_FORMAT_VERSION};
use crate::wire::{decode_frame, encode_frame};

/// Bad arguments, undecodable input frame or output buffer too small.
const ERR_ARGS: c_int = -1;
/// The callback carried a status outside the known tables.
const ERR_UNMAPPED: c_int = -2;

/// Returns the callback frame format version. Also keeps a C symbol in the staticlib.
#[no_mangle]
pub extern "C" fn p2pmon_version() -> u8 {
    CALLBACK_FORMAT_VERSION
}

/// Create a decoder for interface `iface` (UTF-8, `iface_len` bytes). Returns opaque handle or null on failure.
#[no_mangle]
pub extern "C" fn p2pmon_decoder_create(iface: *const u8, iface_len: usize) -> *mut c_void {
    if iface.is_null() {
        return std::ptr::null_mut();
    }
    let bytes = unsafe { slice::from_raw_parts(iface, iface_len) };
    let Ok(name) = std::str::from_utf8(bytes) else {
        return std::ptr::null_mut();
    };
    Box::into_raw(Box::new(Decoder::new(name))) as *mut c_void
}

/// Destroy decoder. No-op if h is null.
#[no_mangle]
pub extern "C" fn p2pmon_decoder_destroy(h: *mut c_void) {
    if h.is_null() {
        return;
    }
    let _ = unsafe { Box::from_raw(h as *mut Decoder) };
}

/// Decode one framed `Callback` and write the framed `P2pEvent` to out_buf.
/// Returns bytes written, 0 if the callback was dropped as malformed, -1 on bad arguments
/// or a too-small out_buf, -2 on an unmapped status.
#[no_mangle]
pub extern "C" fn p2pmon_decoder_decode(
    h: *const c_void,
    frame: *const u8,
    frame_len: usize,
    out_buf: *mut u8,
    out_buf_len: usize,
) -> c_int {
    if h.is_null() || frame.is_null() || out_buf.is_null() {
        return ERR_ARGS;
    }
    let decoder = unsafe { &*(h as *const Decoder) };
    let input = unsafe { slice::from_raw_parts(frame, frame_len) };
    let (callback, _) = match decode_frame::<Callback>(input) {
        Ok(x) => x,
        Err(e) => {
            tracing::debug!(error = %e, "bad callback frame");
            return ERR_ARGS;
        }
    };
    let event: P2pEvent = match decoder.decode(&callback) {
        Ok(event) => event,
        Err(DecodeError::Dropped { callback, reason }) => {
            tracing::debug!(iface = decoder.iface(), callback, %reason, "dropped malformed callback");
            return 0;
        }
        Err(e) => {
            tracing::warn!(iface = decoder.iface(), error = %e, "decode failed");
            return ERR_UNMAPPED;
        }
    };
    let out = match encode_frame(&event) {
        Ok(f) => f,
        Err(_) => return ERR_ARGS,
    };
    if out.len() > out_buf_len {
        return ERR_ARGS;
    }
    unsafe {
        out_buf.copy_from_nonoverlapping(out.as_ptr(), out.len());
    }
    out.len() as c_int
}
