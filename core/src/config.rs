//! Credentials and endpoint for one client instance.

use secrecy::{ExposeSecret as _, SecretString};
use url::Url;

use crate::error::SesError;

/// Endpoint used when `SES_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://email.us-east-1.amazonaws.com/";

/// Immutable credentials and endpoint.
///
/// The secret is held as a `SecretString`, so the derived `Debug` prints it
/// redacted.
#[derive(Clone, Debug)]
pub struct Config {
    access_key_id: String,
    secret_access_key: SecretString,
    endpoint: Url,
}

impl Config {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        endpoint: &str,
    ) -> Result<Self, SesError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SesError::Config(format!("invalid endpoint `{endpoint}`: {e}")))?;
        Ok(Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            endpoint,
        })
    }

    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
    /// `SES_ENDPOINT`.
    pub fn from_env() -> Result<Self, SesError> {
        let access_key_id = require_env("AWS_ACCESS_KEY_ID")?;
        let secret_access_key = require_env("AWS_SECRET_ACCESS_KEY")?;
        let endpoint =
            std::env::var("SES_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::new(access_key_id, secret_access_key, &endpoint)
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub(crate) fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }
}

fn require_env(name: &str) -> Result<String, SesError> {
    std::env::var(name).map_err(|_| SesError::Config(format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_parses_endpoint() {
        let config = Config::new("AKID", "secret", "https://email.eu-west-1.amazonaws.com").unwrap();
        assert_eq!(config.access_key_id(), "AKID");
        assert_eq!(config.endpoint().as_str(), "https://email.eu-west-1.amazonaws.com/");
        assert_eq!(config.secret_access_key(), "secret");
    }

    #[test]
    fn new_rejects_bad_endpoint() {
        let err = Config::new("AKID", "secret", "not a url").unwrap_err();
        assert!(matches!(err, SesError::Config(_)));
    }

    #[test]
    fn debug_does_not_print_secret() {
        let config = Config::new("AKID", "super-secret-value", DEFAULT_ENDPOINT).unwrap();
        let printed = format!("{config:?}");
        assert!(printed.contains("AKID"));
        assert!(!printed.contains("super-secret-value"));
    }
}
