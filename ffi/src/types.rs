//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use ses_core::{HttpMethod, SendDataPoint, SendQuota, SesError};

/// Opaque handle to a `SesClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiSesClient {
    pub(crate) inner: ses_core::SesClient,
}

/// Owned C string. A string with an interior NUL becomes empty.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A signed HTTP request described as C-compatible plain data.
///
/// Built by `ses_build_*` functions. The C caller executes the request
/// (sending every header verbatim) and passes the response back through
/// `ses_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: ses_core::HttpRequest) -> *mut Self {
        let url = c_string(req.url);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request, then
/// passes a pointer to a `ses_parse_*` function. The FFI layer reads but does
/// not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiSesResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Remote = 1,
    Decode = 2,
    Transport = 3,
    Validation = 4,
    Panic = 5,
    NullArg = 6,
    InvalidArg = 7,
}

/// Tag that tells `ses_free_result` what `FfiSesResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is a `char*`: the raw response body of a send operation.
    Text = 1,
    Quota = 2,
    Statistics = 3,
}

#[repr(C)]
pub struct FfiSendQuota {
    pub sent_last_24_hours: f64,
    pub max_24_hour_send: f64,
    pub max_send_rate: f64,
}

/// One statistics interval; `timestamp` is seconds since the Unix epoch.
#[repr(C)]
pub struct FfiSendDataPoint {
    pub complaints: u64,
    pub delivery_attempts: u64,
    pub bounces: u64,
    pub rejects: u64,
    pub timestamp: i64,
}

#[repr(C)]
pub struct FfiSendDataPointList {
    pub items: *mut FfiSendDataPoint,
    pub len: u32,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null. `http_status` is set for
/// `Remote` errors.
#[repr(C)]
pub struct FfiSesResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiSesResult {
    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiSesResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiSesResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Success result carrying the raw body of a send operation.
    pub(crate) fn ok_text(text: String) -> *mut Self {
        Self::ok(FfiDataTag::Text, c_string(text) as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_quota(quota: SendQuota) -> *mut Self {
        let ffi_quota = Box::new(FfiSendQuota {
            sent_last_24_hours: quota.sent_last_24_hours,
            max_24_hour_send: quota.max_24_hour_send,
            max_send_rate: quota.max_send_rate,
        });
        Self::ok(FfiDataTag::Quota, Box::into_raw(ffi_quota) as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_statistics(points: Vec<SendDataPoint>) -> *mut Self {
        let len = points.len() as u32;
        let items = if points.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_points: Box<[FfiSendDataPoint]> = points
                .into_iter()
                .map(|p| FfiSendDataPoint {
                    complaints: p.complaints,
                    delivery_attempts: p.delivery_attempts,
                    bounces: p.bounces,
                    rejects: p.rejects,
                    timestamp: p.timestamp.timestamp(),
                })
                .collect();
            Box::into_raw(ffi_points) as *mut FfiSendDataPoint
        };

        let ffi_list = Box::new(FfiSendDataPointList { items, len });
        Self::ok(FfiDataTag::Statistics, Box::into_raw(ffi_list) as *mut std::ffi::c_void)
    }

    /// Build an error result from a `SesError`.
    pub(crate) fn from_error(err: SesError) -> *mut Self {
        let msg = err.to_string();
        match err {
            SesError::Remote { status, .. } => Self::err(FfiErrorCode::Remote, status, msg),
            SesError::Decode(_) => Self::err(FfiErrorCode::Decode, 0, msg),
            SesError::Transport(_) => Self::err(FfiErrorCode::Transport, 0, msg),
            SesError::Validation(_) => Self::err(FfiErrorCode::Validation, 0, msg),
            SesError::Config(_) => Self::err(FfiErrorCode::InvalidArg, 0, msg),
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
