//! Local-only data service backed by a single JSON document on disk.
//!
//! Behaves like the remote service as far as the store can tell: it assigns
//! `createdAt` on create, keeps it on update, and refuses duplicate or unknown
//! ids.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use super::{Model, RemoteError, RemoteSyncAdapter, SyncResponse};

const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug)]
pub struct LocalFileAdapter {
    path: PathBuf,
    lock: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LocalDocument {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    records: BTreeMap<String, Vec<Value>>,
}

impl LocalFileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<LocalDocument, RemoteError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(LocalDocument::default())
            }
            Err(error) => {
                return Err(RemoteError::transport(format!(
                    "failed to read {}: {error}",
                    self.path.display()
                )))
            }
        };

        if raw.trim().is_empty() {
            return Ok(LocalDocument::default());
        }
        serde_json::from_str(&raw).map_err(|error| {
            RemoteError::payload(format!("failed to parse {}: {error}", self.path.display()))
        })
    }

    async fn save(&self, mut document: LocalDocument) -> Result<(), RemoteError> {
        let write_error = |error: io::Error| {
            RemoteError::transport(format!("failed to write {}: {error}", self.path.display()))
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        document.version = DOCUMENT_VERSION;
        let serialized = serde_json::to_string_pretty(&document)
            .map_err(|error| RemoteError::payload(error.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, serialized)
            .await
            .map_err(write_error)?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(write_error)
    }

    async fn write_record<M: Model>(&self, record: &M::Record, is_create: bool) -> SyncResponse<()> {
        let mut value = match serde_json::to_value(record) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => {
                return SyncResponse::failure(RemoteError::payload(format!(
                    "{} record must be a JSON object",
                    M::TYPE_NAME
                )))
            }
            Err(error) => return SyncResponse::failure(RemoteError::payload(error.to_string())),
        };
        let Some(id) = record_id(&value) else {
            return SyncResponse::failure(RemoteError::payload(format!(
                "{} record has no id",
                M::TYPE_NAME
            )));
        };

        let _guard = self.lock.lock().await;
        let mut document = match self.load().await {
            Ok(document) => document,
            Err(error) => return SyncResponse::failure(error),
        };

        let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        let records = document.records.entry(M::TYPE_NAME.to_string()).or_default();
        let existing = records
            .iter()
            .position(|stored| record_id(stored).as_deref() == Some(id.as_str()));

        match (is_create, existing) {
            (true, Some(_)) => {
                return SyncResponse::failure(RemoteError::typed(
                    "ConditionalCheckFailed",
                    format!("{} {id} already exists", M::TYPE_NAME),
                ));
            }
            (true, None) => {
                set_field(&mut value, "createdAt", now.clone());
                set_field(&mut value, "updatedAt", now);
                records.push(value);
            }
            (false, None) => {
                return SyncResponse::failure(RemoteError::typed(
                    "NotFound",
                    format!("{} {id} does not exist", M::TYPE_NAME),
                ));
            }
            (false, Some(index)) => {
                let created_at = records[index].get("createdAt").cloned().unwrap_or(Value::Null);
                set_field(&mut value, "createdAt", created_at);
                set_field(&mut value, "updatedAt", now);
                records[index] = value;
            }
        }

        match self.save(document).await {
            Ok(()) => SyncResponse::ok(()),
            Err(error) => SyncResponse::failure(error),
        }
    }
}

impl RemoteSyncAdapter for LocalFileAdapter {
    async fn list<M: Model>(&self) -> SyncResponse<Vec<M::Record>> {
        let document = {
            let _guard = self.lock.lock().await;
            match self.load().await {
                Ok(document) => document,
                Err(error) => return SyncResponse::failure(error),
            }
        };

        let mut records = Vec::new();
        let mut errors = Vec::new();
        for value in document.records.get(M::TYPE_NAME).into_iter().flatten() {
            match serde_json::from_value::<M::Record>(value.clone()) {
                Ok(record) => records.push(record),
                Err(error) => errors.push(RemoteError::payload(format!(
                    "invalid stored {} record: {error}",
                    M::TYPE_NAME
                ))),
            }
        }

        SyncResponse {
            data: Some(records),
            errors,
        }
    }

    async fn create<M: Model>(&self, record: &M::Record) -> SyncResponse<()> {
        self.write_record::<M>(record, true).await
    }

    async fn update<M: Model>(&self, record: &M::Record) -> SyncResponse<()> {
        self.write_record::<M>(record, false).await
    }
}

fn record_id(value: &Value) -> Option<String> {
    value.get("id").and_then(Value::as_str).map(ToString::to_string)
}

fn set_field(value: &mut Value, field: &str, field_value: Value) {
    if let Value::Object(map) = value {
        if field_value.is_null() {
            map.remove(field);
        } else {
            map.insert(field.to_string(), field_value);
        }
    }
}
