//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::verified_by::{DecodeError, VerifiedBy};

/// A unique identifier for a note, generated client-side as a random UUID v4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a new unique note ID
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

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Where a note was written
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
}

impl Location {
    #[must_use]
    pub const fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.long)
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Plain text content
    pub content: String,
    pub is_done: bool,
    /// Assigned by the remote on create, never changed afterwards
    pub created_at: Option<DateTime<Utc>>,
    pub location: Option<Location>,
    /// Attached photo bytes
    pub image: Option<Vec<u8>>,
    /// Verifiers that approved this note
    pub verified_by: VerifiedBy,
}

/// Wire form of a [`Note`] as stored by the remote data service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: NoteId,
    pub content: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::base64_bytes"
    )]
    pub image: Option<Vec<u8>>,
    /// JSON array of verifier ids, kept as a string
    #[serde(default)]
    pub verified_by: Option<String>,
}

impl TryFrom<NoteRecord> for Note {
    type Error = DecodeError;

    fn try_from(record: NoteRecord) -> Result<Self, Self::Error> {
        let verified_by = VerifiedBy::decode(record.verified_by.as_deref())?;
        Ok(Self {
            id: record.id,
            content: record.content,
            is_done: record.is_done,
            created_at: record.created_at,
            location: record.location,
            image: record.image,
            verified_by,
        })
    }
}

impl From<&Note> for NoteRecord {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            content: note.content.clone(),
            is_done: note.is_done,
            created_at: note.created_at,
            location: note.location,
            image: note.image.clone(),
            verified_by: Some(note.verified_by.encode()),
        }
    }
}

impl Note {
    /// Create a new note with the given content
    ///
    /// The note has no timestamp yet; the remote assigns one on create.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: NoteId::new(),
            content: content.into(),
            is_done: false,
            created_at: None,
            location: None,
            image: None,
            verified_by: VerifiedBy::default(),
        }
    }

    #[must_use]
    pub const fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }

    /// Full replacement copy of this note carrying `image`
    #[must_use]
    pub fn attach_image(&self, image: Vec<u8>) -> Self {
        self.clone().with_image(image)
    }

    /// Get first line as title preview, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        self.content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }

    /// Check if note content is empty (whitespace-only counts as empty)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
