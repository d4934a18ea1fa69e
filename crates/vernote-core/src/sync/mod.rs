//! Remote data service contract and its adapters.
//!
//! The store only needs `list`, `create` and `update` per model type. Each
//! call answers with whatever data came back plus a list of errors; any error
//! fails the whole call, even when partial data is present.

mod graphql;
mod local;

use std::fmt;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DecodeError, Note, NoteRecord, Verifier};

pub use graphql::GraphQlSyncAdapter;
pub use local::LocalFileAdapter;

/// One error reported by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
        }
    }

    pub fn typed(error_type: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: Some(error_type.to_string()),
        }
    }

    /// The request never got a usable answer
    pub fn transport(message: impl Into<String>) -> Self {
        Self::typed("Transport", message)
    }

    /// The answer could not be read into the expected shape
    pub fn payload(message: impl Into<String>) -> Self {
        Self::typed("InvalidPayload", message)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_type {
            Some(error_type) => write!(f, "{}: {}", error_type, self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Remote sync failed: {}", join_errors(.0))]
    Remote(Vec<RemoteError>),
    #[error("Remote response carried no data for {0}")]
    MissingData(&'static str),
    #[error("Invalid sync configuration: {0}")]
    InvalidConfiguration(String),
}

pub type SyncResult<T> = Result<T, SyncError>;

fn join_errors(errors: &[RemoteError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw answer of one remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResponse<T> {
    pub data: Option<T>,
    pub errors: Vec<RemoteError>,
}

impl<T> SyncResponse<T> {
    pub const fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub const fn failed(errors: Vec<RemoteError>) -> Self {
        Self { data: None, errors }
    }

    pub fn failure(error: RemoteError) -> Self {
        Self::failed(vec![error])
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.data.is_some()
    }

    /// Fail on any reported error, regardless of partial data.
    pub fn into_result(self, context: &'static str) -> SyncResult<T> {
        if !self.errors.is_empty() {
            return Err(SyncError::Remote(self.errors));
        }
        self.data.ok_or(SyncError::MissingData(context))
    }
}

/// A record type the remote data service stores
pub trait Model: Sized + Send + Sync + 'static {
    /// Wire representation exchanged with adapters
    type Record: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Schema type name, e.g. `Note` (drives `listNotes`, `createNote`, ...)
    const TYPE_NAME: &'static str;
    /// GraphQL selection set for one record
    const SELECTION: &'static str;

    fn to_record(&self) -> Self::Record;

    fn from_record(record: Self::Record) -> Result<Self, DecodeError>;
}

impl Model for Note {
    type Record = NoteRecord;

    const TYPE_NAME: &'static str = "Note";
    const SELECTION: &'static str =
        "id content isDone createdAt location { lat long } image verifiedBy";

    fn to_record(&self) -> NoteRecord {
        NoteRecord::from(self)
    }

    fn from_record(record: NoteRecord) -> Result<Self, DecodeError> {
        Self::try_from(record)
    }
}

impl Model for Verifier {
    type Record = Self;

    const TYPE_NAME: &'static str = "Verifier";
    const SELECTION: &'static str = "id name passcode";

    fn to_record(&self) -> Self {
        self.clone()
    }

    fn from_record(record: Self) -> Result<Self, DecodeError> {
        Ok(record)
    }
}

/// Backend-as-a-service client used by the note store
pub trait RemoteSyncAdapter: Send + Sync {
    /// Every stored record of model `M`
    fn list<M: Model>(&self) -> impl Future<Output = SyncResponse<Vec<M::Record>>> + Send;

    fn create<M: Model>(&self, record: &M::Record) -> impl Future<Output = SyncResponse<()>> + Send;

    /// Replace the stored record with the same id
    fn update<M: Model>(&self, record: &M::Record) -> impl Future<Output = SyncResponse<()>> + Send;
}
