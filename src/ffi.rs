//! C FFI layer for zkscan.
//!
//! Lets a native addon (Node, Electron, .NET) drive the scanner in-process
//! instead of spawning the CLI. Every call returns the same JSON line the
//! CLI prints, as a heap string released with `zk_string_free`.
//! The generated C header is written to `include/zkscan.h` by cbindgen.

use crate::commands::{self, CaptureOptions};
use crate::config::Config;
use crate::error::LastError;
use crate::poller::{CancelToken, Canceller};
use crate::report::Report;
use crate::sdk::ZkfpLibrary;
use crate::types::AttemptBudget;
use std::ffi::{c_char, c_int, CString};

/// Last error message for C consumers.
static LAST_ERROR: LastError = LastError::new();

/// Opaque cancellation handle for C consumers.
pub struct ZkCancelToken {
    canceller: Canceller,
    token: CancelToken,
}

fn into_c_string(report: &Report) -> *mut c_char {
    if report.is_success() {
        LAST_ERROR.clear();
    } else {
        LAST_ERROR.set(&report.to_line());
    }
    match CString::new(report.to_line()) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            LAST_ERROR.set(&e);
            std::ptr::null_mut()
        }
    }
}

fn load_zkfp(config: &Config) -> Result<ZkfpLibrary, Report> {
    ZkfpLibrary::load(&config.zkfp_library).map_err(Report::from)
}

/// Create a cancellation token for `zk_capture_json`.
#[no_mangle]
pub extern "C" fn zk_cancel_token_new() -> *mut ZkCancelToken {
    let (canceller, token) = CancelToken::pair();
    Box::into_raw(Box::new(ZkCancelToken { canceller, token }))
}

/// Request cancellation. Safe to call from any thread while a capture runs.
///
/// # Safety
/// `token` must be a pointer returned by `zk_cancel_token_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn zk_cancel_token_cancel(token: *const ZkCancelToken) {
    if token.is_null() {
        return;
    }
    (*token).canceller.cancel();
}

/// Free a cancellation token. Must not be called while a capture using it
/// is still running.
///
/// # Safety
/// `token` must be a pointer returned by `zk_cancel_token_new`, or null.
#[no_mangle]
pub unsafe extern "C" fn zk_cancel_token_free(token: *mut ZkCancelToken) {
    if !token.is_null() {
        drop(Box::from_raw(token));
    }
}

/// Initialise the SDK and count scanners. Returns a JSON line.
#[no_mangle]
pub extern "C" fn zk_test_json() -> *mut c_char {
    let config = Config::from_env();
    let report = match load_zkfp(&config) {
        Ok(sdk) => commands::test(&sdk),
        Err(report) => report,
    };
    into_c_string(&report)
}

/// Capture a fingerprint, polling for up to `timeout_seconds` (1..=120,
/// anything else uses the configured default). `include_image` = 0 omits
/// the hex image. `token` may be null.
///
/// # Safety
/// `token` must be a pointer returned by `zk_cancel_token_new`, or null,
/// and must stay valid until this call returns.
#[no_mangle]
pub unsafe extern "C" fn zk_capture_json(
    timeout_seconds: c_int,
    include_image: c_int,
    token: *const ZkCancelToken,
) -> *mut c_char {
    let config = Config::from_env();
    let budget = if timeout_seconds > 0 {
        AttemptBudget::parse(Some(&timeout_seconds.to_string()), config.default_budget)
    } else {
        config.default_budget
    };
    let options = CaptureOptions {
        budget,
        device_index: config.device_index,
        include_image: include_image != 0,
    };
    let cancel = if token.is_null() {
        CancelToken::never()
    } else {
        (*token).token.clone()
    };

    let report = match load_zkfp(&config) {
        Ok(sdk) => commands::capture(&sdk, &options, cancel),
        Err(report) => report,
    };
    into_c_string(&report)
}

/// Free a string returned by this library.
///
/// # Safety
/// `s` must be a pointer returned by a `zk_*_json` function, or null.
#[no_mangle]
pub unsafe extern "C" fn zk_string_free(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Get the last error message. Returns NULL if the last call succeeded.
/// The returned pointer is valid until the next zkscan API call.
#[no_mangle]
pub extern "C" fn zk_last_error() -> *const c_char {
    LAST_ERROR.as_ptr()
}
