//! `AWS3-HTTPS` request signing.
//!
//! # Design
//! The signature covers only the `Date` header value: HMAC-SHA256 of the date
//! string keyed by the secret access key, base64 encoded. The signed string
//! must be sent verbatim in the `Date` header or the service rejects the
//! request, so `date_header` is the single place that formats it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the authorization value.
pub const AUTHORIZATION_HEADER: &str = "X-Amzn-Authorization";

/// Header carrying the signed date string.
pub const DATE_HEADER: &str = "Date";

const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";

/// Format `now` the way the service expects it in the `Date` header,
/// e.g. `Tue, 25 May 2010 21:20:27 +0000`.
pub fn date_header(now: DateTime<Utc>) -> String {
    now.format(DATE_FORMAT).to_string()
}

/// Base64 HMAC-SHA256 of `date` keyed by `secret_access_key`.
pub fn signature(date: &str, secret_access_key: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret_access_key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(date.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Build the `X-Amzn-Authorization` header value for `date`.
pub fn authorization_header(date: &str, access_key_id: &str, secret_access_key: &str) -> String {
    format!(
        "AWS3-HTTPS AWSAccessKeyId={access_key_id}, Algorithm=HmacSHA256, Signature={}",
        signature(date, secret_access_key)
    )
}
