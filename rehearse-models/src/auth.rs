//! API key handling.
//!
//! Keys are read from an environment variable named in configuration and
//! kept in a [`SecretString`] so they never show up in logs.

use std::env;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::{Error, Result};

/// A secure API key that prevents accidental logging.
///
/// `Debug` prints `ApiKey([REDACTED])`; the value is only reachable through
/// [`expose_secret`](Self::expose_secret).
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Create a new API key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    /// Read a key from the named environment variable.
    ///
    /// Blank values count as missing.
    pub fn from_env(var: &str) -> Result<Self> {
        match env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                debug!(var, "loaded API key from environment");
                Ok(Self::new(value.trim()))
            }
            _ => Err(Error::CredentialsNotFound(var.to_string())),
        }
    }

    /// Expose the secret key value.
    ///
    /// Use sparingly - only when actually sending to an API.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-test-123");
        assert_eq!(format!("{:?}", key), "ApiKey([REDACTED])");
        assert_eq!(key.expose_secret(), "sk-test-123");
    }

    #[test]
    fn from_env_missing_variable_is_an_error() {
        let err = ApiKey::from_env("REHEARSE_TEST_KEY_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, Error::CredentialsNotFound(_)));
        assert!(err.to_string().contains("REHEARSE_TEST_KEY_THAT_IS_NEVER_SET"));
    }
}
