//! Credential providers

use crate::error::{RelishError, Result};
use std::fmt;

pub const EMAIL_ENV: &str = "RELISH_EMAIL";
pub const PASSWORD_ENV: &str = "RELISH_PASSWORD";

/// Login identity and secret
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Source of login credentials
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Result<Credentials>;
}

/// Reads `RELISH_EMAIL` / `RELISH_PASSWORD`
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialProvider;

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self) -> Result<Credentials> {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        match (read(EMAIL_ENV), read(PASSWORD_ENV)) {
            (Some(identity), Some(secret)) => Ok(Credentials { identity, secret }),
            (identity, _) => {
                let missing = if identity.is_none() {
                    EMAIL_ENV
                } else {
                    PASSWORD_ENV
                };
                Err(RelishError::missing_credentials(format!(
                    "Missing credentials: {missing} is not set"
                )))
            }
        }
    }
}

/// Fixed credentials, or none at all
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    credentials: Option<Credentials>,
}

impl StaticCredentialProvider {
    pub fn new(identity: &str, secret: &str) -> Self {
        Self {
            credentials: Some(Credentials::new(identity, secret)),
        }
    }

    pub fn missing() -> Self {
        Self { credentials: None }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<Credentials> {
        self.credentials
            .clone()
            .ok_or_else(|| RelishError::missing_credentials("Missing credentials"))
    }
}
