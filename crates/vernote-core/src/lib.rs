//! vernote-core - Core library for vernote
//!
//! Shared models, day grouping and filtering, passcode-gated verification,
//! and the note store that caches the remote data service.

pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod sync;
pub mod timeline;
pub mod util;
pub mod verification;

pub use error::{Error, Result};
pub use models::{Location, Note, NoteId, Passcode, Verifier, VerifierId};
pub use store::{NoteDraft, NoteStore, Snapshot};
pub use timeline::{filter_groups, group_by_day, group_by_local_day, DateKey, DayGroups};
