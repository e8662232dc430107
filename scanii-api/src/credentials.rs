//! API credentials: a key/secret pair or a temporary auth token.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use crate::ScaniiError;
use crate::models::AuthToken;

/// Environment variable holding `key:secret` credentials.
pub const CREDENTIALS_ENV_VAR: &str = "SCANII_CREDS";

const DELIMITER: char = ':';

/// How a client authenticates against the Scanii API.
///
/// Both variants are sent as HTTP Basic auth; a token is used as the
/// username with an empty password.
#[derive(Debug, Clone)]
pub enum ScaniiCredentials {
    /// Long-lived API key and secret
    KeySecret {
        key: String,
        secret: Arc<SecretString>,
    },
    /// Temporary auth token id, see [`crate::ScaniiClient::create_auth_token`]
    Token { token: Arc<SecretString> },
}

impl ScaniiCredentials {
    /// Create key/secret credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Configuration`] if either part is empty or
    /// contains the `:` delimiter.
    pub fn key_secret(
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ScaniiError> {
        let key = key.into();
        let secret = secret.into();
        validate_part(&key, "key")?;
        validate_part(&secret, "secret")?;

        Ok(Self::KeySecret {
            key,
            secret: Arc::new(SecretString::new(secret.into())),
        })
    }

    /// Create credentials from an auth token id.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Configuration`] if the token is empty or
    /// contains the `:` delimiter.
    pub fn token(token: impl Into<String>) -> Result<Self, ScaniiError> {
        let token = token.into();
        validate_part(&token, "token")?;

        Ok(Self::Token {
            token: Arc::new(SecretString::new(token.into())),
        })
    }

    /// Create credentials from a token returned by the auth token API.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Configuration`] if the token id is not usable.
    pub fn from_auth_token(token: &AuthToken) -> Result<Self, ScaniiError> {
        Self::token(token.resource_id.as_str())
    }

    /// Parse a `key:secret` pair.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Configuration`] when the value has no delimiter
    /// or either side is invalid.
    pub fn parse_pair(value: &str) -> Result<Self, ScaniiError> {
        let (key, secret) = value.split_once(DELIMITER).ok_or_else(|| {
            ScaniiError::Configuration("credentials must be in the form key:secret".to_string())
        })?;
        Self::key_secret(key, secret)
    }

    /// Load key/secret credentials from `SCANII_CREDS`.
    ///
    /// # Errors
    ///
    /// Returns [`ScaniiError::Configuration`] when the variable is missing or
    /// malformed.
    pub fn from_env() -> Result<Self, ScaniiError> {
        let value = std::env::var(CREDENTIALS_ENV_VAR).map_err(|_| {
            ScaniiError::Configuration(format!("{CREDENTIALS_ENV_VAR} environment variable not set"))
        })?;
        Self::parse_pair(&value)
    }

    /// Username part of the Basic auth pair.
    #[must_use]
    pub fn username(&self) -> &str {
        match self {
            Self::KeySecret { key, .. } => key,
            Self::Token { token } => token.expose_secret(),
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        let pair = match self {
            Self::KeySecret { key, secret } => format!("{key}:{}", secret.expose_secret()),
            Self::Token { token } => format!("{}:", token.expose_secret()),
        };
        format!("Basic {}", STANDARD.encode(pair))
    }
}

fn validate_part(value: &str, field_name: &str) -> Result<(), ScaniiError> {
    if value.is_empty() {
        return Err(ScaniiError::Configuration(format!(
            "{field_name} cannot be empty"
        )));
    }

    if value.contains(DELIMITER) {
        return Err(ScaniiError::Configuration(format!(
            "{field_name} must not include the '{DELIMITER}' character"
        )));
    }

    Ok(())
}
