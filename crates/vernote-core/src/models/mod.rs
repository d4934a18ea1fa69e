//! Data models for vernote

mod base64_bytes;
mod note;
mod verified_by;
mod verifier;

pub use note::{Location, Note, NoteId, NoteRecord};
pub use verified_by::{DecodeError, VerifiedBy};
pub use verifier::{Passcode, Verifier, VerifierId};
