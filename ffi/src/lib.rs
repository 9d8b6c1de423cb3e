//! C-ABI wrapper around `ses-core`.
//!
//! # Overview
//! Exposes the SES request builders and response parsers through
//! `extern "C"` functions so any language with a C FFI can produce signed
//! requests and decode responses, while executing the HTTP round trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `ses_build_*` / `ses_parse_*` mirrors the core API 1:1.
//! - Builders take the signing time as Unix seconds; a negative value means
//!   "now".
//! - A single `FfiSesResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `ses_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use chrono::{DateTime, Utc};
use ses_core::{Config, HttpResponse, SesClient};

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Signing time for a builder call.
fn signing_time(unix_seconds: i64) -> Option<DateTime<Utc>> {
    if unix_seconds < 0 {
        return Some(Utc::now());
    }
    DateTime::from_timestamp(unix_seconds, 0)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `SesClient` for the given credentials and endpoint URL.
///
/// Returns null if any argument is null, not UTF-8, or the endpoint is not a
/// valid URL. The caller must free the returned pointer with `ses_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn ses_client_new(
    access_key_id: *const c_char,
    secret_access_key: *const c_char,
    endpoint: *const c_char,
) -> *mut FfiSesClient {
    catch_unwind(|| {
        let args = unsafe {
            (
                str_arg(access_key_id),
                str_arg(secret_access_key),
                str_arg(endpoint),
            )
        };
        let (Some(id), Some(secret), Some(endpoint)) = args else {
            return std::ptr::null_mut();
        };
        match Config::new(id, secret, endpoint) {
            Ok(config) => Box::into_raw(Box::new(FfiSesClient {
                inner: SesClient::new(config),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `ses_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ses_client_free(client: *mut FfiSesClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a signed `SendEmail` request to a single recipient.
///
/// `body_html` may be null for a text-only message.
/// Returns null if any other argument is null or not UTF-8.
/// The caller must free the returned pointer with `ses_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn ses_build_send_email(
    client: *const FfiSesClient,
    from: *const c_char,
    to: *const c_char,
    subject: *const c_char,
    body_text: *const c_char,
    body_html: *const c_char,
    unix_seconds: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let args = unsafe { (str_arg(from), str_arg(to), str_arg(subject), str_arg(body_text)) };
        let (Some(from), Some(to), Some(subject), Some(text)) = args else {
            return std::ptr::null_mut();
        };
        let Some(now) = signing_time(unix_seconds) else {
            return std::ptr::null_mut();
        };
        let req = if body_html.is_null() {
            client.inner.build_send_email(from, to, subject, text, now)
        } else {
            let Some(html) = (unsafe { str_arg(body_html) }) else {
                return std::ptr::null_mut();
            };
            client
                .inner
                .build_send_email_html(from, to, subject, text, html, now)
        };
        FfiHttpRequest::from_core(req)
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed `SendRawEmail` request for `len` bytes at `data`.
///
/// Returns null if `client` is null, or `data` is null while `len` > 0.
#[unsafe(no_mangle)]
pub extern "C" fn ses_build_send_raw_email(
    client: *const FfiSesClient,
    data: *const u8,
    len: usize,
    unix_seconds: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || (data.is_null() && len > 0) {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let raw: &[u8] = if len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(data, len) }
        };
        let Some(now) = signing_time(unix_seconds) else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(client.inner.build_send_raw_email(raw, now))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed `GetSendQuota` request.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn ses_build_get_send_quota(
    client: *const FfiSesClient,
    unix_seconds: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(now) = signing_time(unix_seconds) else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(client.inner.build_get_send_quota(now))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a signed `GetSendStatistics` request.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn ses_build_get_send_statistics(
    client: *const FfiSesClient,
    unix_seconds: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(now) = signing_time(unix_seconds) else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(client.inner.build_get_send_statistics(now))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// read as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }
            .to_string_lossy()
            .into_owned()
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Parse the response of any send request.
///
/// Returns a result with `data_tag = Text` (the raw body) on success.
#[unsafe(no_mangle)]
pub extern "C" fn ses_parse_send(
    client: *const FfiSesClient,
    response: *const FfiHttpResponse,
) -> *mut FfiSesResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiSesResult::null_arg("client");
        }
        if response.is_null() {
            return FfiSesResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.inner.parse_send(core_resp) {
            Ok(text) => FfiSesResult::ok_text(text),
            Err(e) => FfiSesResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSesResult::panic("panic in ses_parse_send"))
}

/// Parse a `GetSendQuota` response.
///
/// Returns a result with `data_tag = Quota` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ses_parse_get_send_quota(
    client: *const FfiSesClient,
    response: *const FfiHttpResponse,
) -> *mut FfiSesResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiSesResult::null_arg("client");
        }
        if response.is_null() {
            return FfiSesResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.inner.parse_get_send_quota(core_resp) {
            Ok(quota) => FfiSesResult::ok_quota(quota),
            Err(e) => FfiSesResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSesResult::panic("panic in ses_parse_get_send_quota"))
}

/// Parse a `GetSendStatistics` response.
///
/// Returns a result with `data_tag = Statistics` on success; an empty list
/// has `len = 0` and `items = NULL`.
#[unsafe(no_mangle)]
pub extern "C" fn ses_parse_get_send_statistics(
    client: *const FfiSesClient,
    response: *const FfiHttpResponse,
) -> *mut FfiSesResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiSesResult::null_arg("client");
        }
        if response.is_null() {
            return FfiSesResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let core_resp = ffi_response_to_core(unsafe { &*response });
        match client.inner.parse_get_send_statistics(core_resp) {
            Ok(points) => FfiSesResult::ok_statistics(points),
            Err(e) => FfiSesResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSesResult::panic("panic in ses_parse_get_send_statistics"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `ses_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ses_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        ses_free_string(req.url);
        ses_free_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                ses_free_string(h.key);
                ses_free_string(h.value);
            }
        }
    });
}

/// Free an `FfiSesResult` returned by any `ses_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn ses_free_result(result: *mut FfiSesResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        ses_free_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Text => ses_free_string(result.data as *mut c_char),
            FfiDataTag::Quota => {
                drop(unsafe { Box::from_raw(result.data as *mut FfiSendQuota) });
            }
            FfiDataTag::Statistics => {
                let list = unsafe { Box::from_raw(result.data as *mut FfiSendDataPointList) };
                if !list.items.is_null() && list.len > 0 {
                    drop(unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            list.items,
                            list.len as usize,
                        ))
                    });
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ses_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
