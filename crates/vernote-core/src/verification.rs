//! Passcode checks and verification-state transitions.
//!
//! Everything here is pure. Callers persist the notes returned by
//! [`record_verification`] through the note store.

use thiserror::Error;

use crate::models::{Note, Passcode, Verifier, VerifierId};

/// Reasons a passcode entry is rejected. All are recoverable by re-entry.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PasscodeError {
    #[error("Passcode cannot be empty")]
    EmptyInput,
    #[error("Passcode must be exactly 6 digits")]
    WrongLength,
    #[error("Passcode must contain only digits")]
    NotNumeric,
    #[error("Passcode does not match")]
    Mismatch,
    #[error("Passcode must be between 100000 and 999999")]
    OutOfRange,
}

/// Proof that a passcode entry matched a verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verified {
    pub verifier_id: VerifierId,
}

#[must_use]
pub fn is_verified(note: &Note, verifier_id: &VerifierId) -> bool {
    note.verified_by.contains(verifier_id)
}

/// Copy of `note` with `verifier_id` appended to its verifiers.
///
/// Recording an id that is already present returns an identical copy.
#[must_use]
pub fn record_verification(note: &Note, verifier_id: VerifierId) -> Note {
    let mut updated = note.clone();
    updated.verified_by.insert(verifier_id);
    updated
}

pub fn check_passcode(verifier: &Verifier, candidate: &str) -> Result<Verified, PasscodeError> {
    let value = parse_entry(candidate)?;
    if value != verifier.passcode.value() {
        return Err(PasscodeError::Mismatch);
    }
    Ok(Verified {
        verifier_id: verifier.id,
    })
}

pub fn validate_new_passcode(candidate: &str) -> Result<Passcode, PasscodeError> {
    Passcode::new(parse_entry(candidate)?)
}

fn parse_entry(candidate: &str) -> Result<u32, PasscodeError> {
    if candidate.trim().is_empty() {
        return Err(PasscodeError::EmptyInput);
    }
    if candidate.chars().count() != Passcode::DIGITS {
        return Err(PasscodeError::WrongLength);
    }
    if !candidate.chars().all(|c| c.is_ascii_digit()) {
        return Err(PasscodeError::NotNumeric);
    }
    candidate.parse().map_err(|_| PasscodeError::NotNumeric)
}
