//! Phone Value Object
//!
//! E.164 phone number. Spaces, dashes and parentheses are stripped before
//! validation so `+1 (555) 123-4567` and `+15551234567` are the same number.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn e164() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+[1-9]\d{9,14}$").expect("static E.164 pattern"))
}

/// Phone number value object (E.164)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Normalise and validate a phone number
    pub fn parse(value: &str) -> Result<Self, PhoneError> {
        let normalized = Self::normalize(value);

        if normalized.is_empty() {
            return Err(PhoneError::Empty);
        }

        if !normalized.starts_with('+') {
            return Err(PhoneError::MissingCountryCode);
        }

        if !e164().is_match(&normalized) {
            return Err(PhoneError::InvalidFormat);
        }

        Ok(Self(normalized))
    }

    /// Format as E.164
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn normalize(value: &str) -> String {
        value
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect()
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    Empty,
    MissingCountryCode,
    InvalidFormat,
}

impl std::error::Error for PhoneError {}

impl fmt::Display for PhoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "phone number cannot be empty"),
            Self::MissingCountryCode => write!(f, "phone number must start with +<country code>"),
            Self::InvalidFormat => write!(f, "invalid phone number format"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_e164() {
        let phone = Phone::parse("+15551234567").unwrap();
        assert_eq!(phone.as_str(), "+15551234567");
    }

    #[test]
    fn test_phone_normalised() {
        let phone = Phone::parse(" +1 (555) 123-4567 ").unwrap();
        assert_eq!(phone.as_str(), "+15551234567");
    }

    #[test]
    fn test_phone_requires_country_code() {
        assert_eq!(Phone::parse("5551234567"), Err(PhoneError::MissingCountryCode));
    }

    #[test]
    fn test_phone_length_bounds() {
        assert_eq!(Phone::parse("+155512345"), Err(PhoneError::InvalidFormat));
        assert!(Phone::parse("+573001234567").is_ok());
        assert_eq!(Phone::parse("+1555123456789012"), Err(PhoneError::InvalidFormat));
    }

    #[test]
    fn test_phone_rejects_leading_zero_and_letters() {
        assert_eq!(Phone::parse("+05551234567"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse("+1555CALLNOW"), Err(PhoneError::InvalidFormat));
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
    }
}
