//! Error types for the SES client.
//!
//! # Design
//! Every failure is classified into exactly one variant and returned to the
//! caller untouched; nothing here logs or retries. `Remote` has one shape for
//! both GET and POST so callers can match on the status code regardless of
//! which operation failed.

/// Boxed error produced by a `Transport` implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `SesClient` and `SesMailer`.
#[derive(Debug, thiserror::Error)]
pub enum SesError {
    /// The request never produced an HTTP response (DNS, connect, TLS, timeout).
    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),

    /// The service answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// A query response body was not XML of the expected shape.
    #[error("could not decode response: {0}")]
    Decode(#[from] quick_xml::DeError),

    /// The request was rejected before any I/O.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The client configuration could not be built.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SesError {
    /// HTTP status of a `Remote` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            SesError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
