//! Synchronous client core for the Amazon SES query API.
//!
//! # Overview
//! Builds signed `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `SesMailer` pairs the core
//! with an injected `Transport` to expose the five operations as blocking
//! calls: `send_email`, `send_email_html`, `send_raw_email`,
//! `get_send_quota` and `get_send_statistics`.
//!
//! # Design
//! - `SesClient` is stateless; it holds only the immutable `Config`.
//! - Each operation is split into `build_*` (signed request) and `parse_*`
//!   (typed result), so the I/O boundary is explicit.
//! - Requests are signed with the `AWS3-HTTPS` scheme: HMAC-SHA256 over the
//!   `Date` header.
//! - Errors are returned, never logged; `tracing` events only record which
//!   request went out and which status came back.
//!
//! ```no_run
//! use ses_core::{Config, SesMailer};
//!
//! # fn main() -> Result<(), ses_core::SesError> {
//! let mailer = SesMailer::with_ureq(Config::from_env()?);
//! mailer.send_email("a@example.com", "b@example.com", "Hi", "Hello")?;
//! let quota = mailer.get_send_quota()?;
//! println!("{} of {} sent", quota.sent_last_24_hours, quota.max_24_hour_send);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mailer;
pub mod sign;
pub mod types;

pub use client::{message_id, ParameterSet, SesClient};
pub use config::Config;
pub use error::{BoxError, SesError};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use mailer::SesMailer;
pub use types::{EmailMessage, SendDataPoint, SendQuota};
