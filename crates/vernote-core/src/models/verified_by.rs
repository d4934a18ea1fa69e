//! The set of verifiers that approved a note.
//!
//! Persisted as a JSON array of verifier ids serialized into a single string
//! field, e.g. `"[\"3f0c…\",\"9a1e…\"]"`. An absent or empty field is the
//! empty set.

use thiserror::Error;

use super::VerifierId;

/// A stored verification list could not be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed verification list: {0}")]
    Malformed(String),
    #[error("Invalid verifier id in verification list: {0}")]
    InvalidId(String),
}

/// Ordered, duplicate-free list of verifier ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedBy(Vec<VerifierId>);

impl VerifiedBy {
    /// Decode the wire form. Duplicates collapse to their first occurrence.
    pub fn decode(raw: Option<&str>) -> Result<Self, DecodeError> {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(Self::default());
        };

        let ids: Vec<String> = serde_json::from_str(raw)
            .map_err(|error| DecodeError::Malformed(error.to_string()))?;

        let mut verified = Self::default();
        for id in ids {
            let parsed = id
                .parse::<VerifierId>()
                .map_err(|_| DecodeError::InvalidId(id.clone()))?;
            if !verified.insert(parsed) {
                tracing::debug!("Dropped duplicate verifier id {} while decoding", id);
            }
        }
        Ok(verified)
    }

    /// Encode as a JSON array of id strings
    #[must_use]
    pub fn encode(&self) -> String {
        let ids = self.0.iter().map(VerifierId::as_str).collect::<Vec<_>>();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    #[must_use]
    pub fn contains(&self, id: &VerifierId) -> bool {
        self.0.contains(id)
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: VerifierId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &VerifierId> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
