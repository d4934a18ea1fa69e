//! Verifier model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::verification::PasscodeError;

/// A unique identifier for a verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerifierId(Uuid);

impl VerifierId {
    /// Create a new unique verifier ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for VerifierId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VerifierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VerifierId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Six-digit shared secret of a verifier, always within `MIN..=MAX`.
///
/// Passcodes are bounded integers, so a typed `012345` is rejected as out of
/// range instead of being stored as `12345`.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Passcode(u32);

impl Passcode {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;
    /// Number of digits a passcode entry must have
    pub const DIGITS: usize = 6;

    pub const fn new(value: u32) -> Result<Self, PasscodeError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(PasscodeError::OutOfRange);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Passcode {
    type Error = PasscodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Passcode> for u32 {
    fn from(passcode: Passcode) -> Self {
        passcode.0
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passcode([REDACTED])")
    }
}

/// A named holder of a passcode who can approve notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verifier {
    pub id: VerifierId,
    pub name: String,
    pub passcode: Passcode,
}

impl Verifier {
    #[must_use]
    pub fn new(name: impl Into<String>, passcode: Passcode) -> Self {
        Self {
            id: VerifierId::new(),
            name: name.into(),
            passcode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passcode_bounds() {
        assert!(Passcode::new(100_000).is_ok());
        assert!(Passcode::new(999_999).is_ok());
        assert_eq!(Passcode::new(99_999), Err(PasscodeError::OutOfRange));
        assert_eq!(Passcode::new(1_000_000), Err(PasscodeError::OutOfRange));
    }

    #[test]
    fn passcode_debug_is_redacted() {
        let verifier = Verifier::new("Alice", Passcode::new(123_456).unwrap());
        let debug = format!("{verifier:?}");
        assert!(!debug.contains("123456"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn wire_passcode_is_integer_and_range_checked() {
        let verifier = Verifier::new("Alice", Passcode::new(123_456).unwrap());
        let value = serde_json::to_value(&verifier).unwrap();
        assert_eq!(value["passcode"], 123_456);

        let payload = format!(
            r#"{{"id":"{}","name":"Bob","passcode":12345}}"#,
            VerifierId::new()
        );
        assert!(serde_json::from_str::<Verifier>(&payload).is_err());
    }
}
