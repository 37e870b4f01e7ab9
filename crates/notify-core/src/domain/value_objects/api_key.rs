//! API Key Value Object

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix carried by every issued key
pub const API_KEY_PREFIX: &str = "nfy_";

const KEY_BYTES: usize = 32;
const MIN_KEY_LEN: usize = 10;

/// Secret token authenticating a business.
///
/// `Debug` and `Display` only reveal a short prefix; use [`ApiKey::expose`]
/// where the full value is required (index keys, responses).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Generate a fresh key: `nfy_` + URL-safe base64 of 32 random bytes
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(format!("{}{}", API_KEY_PREFIX, URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Validate the format of a caller-supplied key
    pub fn parse(value: &str) -> Result<Self, ApiKeyError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ApiKeyError::Missing);
        }
        if !value.starts_with(API_KEY_PREFIX) || value.len() < MIN_KEY_LEN {
            return Err(ApiKeyError::InvalidFormat);
        }
        Ok(Self(value.to_string()))
    }

    /// Full secret value
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form for logs
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(API_KEY_PREFIX.len() + 4).collect();
        format!("{}…", visible)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyError {
    Missing,
    InvalidFormat,
}

impl std::error::Error for ApiKeyError {}

impl fmt::Display for ApiKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "API key is required"),
            Self::InvalidFormat => write!(f, "invalid API key format"),
        }
    }
}
