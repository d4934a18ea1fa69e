//! Note store: the client-side cache of notes and verifiers.
//!
//! The remote data service is the system of record. Every successful write is
//! followed by a full refresh; the local snapshot is only ever replaced as a
//! whole, never patched.

use std::sync::Arc;

use chrono::TimeZone;
use tokio::sync::watch;

use crate::models::{Location, Note, NoteId, Verifier, VerifierId};
use crate::sync::{Model, RemoteSyncAdapter, SyncResult};
use crate::timeline::{group_by_day, DayGroups};
use crate::verification::{
    check_passcode, is_verified, record_verification, validate_new_passcode, Verified,
};
use crate::{Error, Result};

/// Immutable view of everything fetched by the last successful refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    notes: Vec<Note>,
    verifiers: Vec<Verifier>,
}

impl Snapshot {
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn verifiers(&self) -> &[Verifier] {
        &self.verifiers
    }

    #[must_use]
    pub fn find_note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    #[must_use]
    pub fn find_verifier(&self, id: &VerifierId) -> Option<&Verifier> {
        self.verifiers.iter().find(|verifier| &verifier.id == id)
    }

    /// Notes bucketed by calendar day in `tz`
    #[must_use]
    pub fn day_groups<Tz: TimeZone>(&self, tz: &Tz) -> DayGroups {
        group_by_day(&self.notes, tz)
    }
}

/// Input for a new note
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub content: String,
    pub location: Option<Location>,
    pub image: Option<Vec<u8>>,
}

impl NoteDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

pub struct NoteStore<A> {
    adapter: A,
    snapshot: watch::Sender<Arc<Snapshot>>,
}

impl<A: RemoteSyncAdapter> NoteStore<A> {
    pub fn new(adapter: A) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        Self { adapter, snapshot }
    }

    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Current snapshot; empty until the first successful refresh
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Observe snapshot replacements
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    /// Replace the snapshot with the remote contents.
    ///
    /// Nothing changes locally when either list call fails or a stored note
    /// cannot be decoded.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let notes = self.fetch_all::<Note>().await?;
        let verifiers = self.fetch_all::<Verifier>().await?;

        let snapshot = Arc::new(Snapshot { notes, verifiers });
        self.snapshot.send_replace(Arc::clone(&snapshot));
        tracing::debug!(
            "Refreshed snapshot: {} notes, {} verifiers",
            snapshot.notes.len(),
            snapshot.verifiers.len()
        );
        Ok(snapshot)
    }

    pub async fn create(&self, note: &Note) -> Result<()> {
        self.write(WriteKind::Create, note).await
    }

    pub async fn update(&self, note: &Note) -> Result<()> {
        self.write(WriteKind::Update, note).await
    }

    pub async fn create_verifier(&self, verifier: &Verifier) -> Result<()> {
        self.write(WriteKind::Create, verifier).await
    }

    /// Create a note from user input and return its id
    pub async fn add_note(&self, draft: NoteDraft) -> Result<NoteId> {
        let content = draft.content.trim();
        if content.is_empty() {
            return Err(Error::InvalidInput(
                "Note content cannot be empty".to_string(),
            ));
        }

        let mut note = Note::new(content);
        note.location = draft.location;
        note.image = draft.image.filter(|image| !image.is_empty());
        self.create(&note).await?;
        Ok(note.id)
    }

    /// Replace the photo attached to a note
    pub async fn attach_image(&self, note_id: &NoteId, image: Vec<u8>) -> Result<()> {
        if image.is_empty() {
            return Err(Error::InvalidInput("Image cannot be empty".to_string()));
        }
        let note = self.require_note(note_id)?;
        self.update(&note.attach_image(image)).await
    }

    /// Register a verifier; the passcode must be six digits in range
    pub async fn add_verifier(&self, name: &str, passcode_input: &str) -> Result<VerifierId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput(
                "Verifier name cannot be empty".to_string(),
            ));
        }
        let passcode = validate_new_passcode(passcode_input)?;

        let verifier = Verifier::new(name, passcode);
        self.create_verifier(&verifier).await?;
        Ok(verifier.id)
    }

    /// Approve a note as `verifier_id` after checking the entered passcode.
    ///
    /// A note the verifier already approved is left as is.
    pub async fn verify(
        &self,
        note_id: &NoteId,
        verifier_id: &VerifierId,
        candidate: &str,
    ) -> Result<Verified> {
        let note = self.require_note(note_id)?;
        let verifier = self
            .snapshot()
            .find_verifier(verifier_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("verifier {verifier_id}")))?;

        let verified = check_passcode(&verifier, candidate)?;
        if is_verified(&note, &verified.verifier_id) {
            tracing::info!("Note {} already verified by {}", note.id, verifier.id);
            return Ok(verified);
        }

        self.update(&record_verification(&note, verified.verifier_id))
            .await?;
        Ok(verified)
    }

    fn require_note(&self, note_id: &NoteId) -> Result<Note> {
        self.snapshot()
            .find_note(note_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("note {note_id}")))
    }

    async fn fetch_all<M: Model>(&self) -> Result<Vec<M>> {
        let records = self
            .adapter
            .list::<M>()
            .await
            .into_result(M::TYPE_NAME)
            .inspect_err(|error| {
                tracing::warn!("Listing {} records failed: {}", M::TYPE_NAME, error);
            })?;

        records
            .into_iter()
            .map(M::from_record)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|error| {
                tracing::warn!("Stored {} record could not be decoded: {}", M::TYPE_NAME, error);
                Error::Decode(error)
            })
    }

    async fn write<M: Model>(&self, kind: WriteKind, model: &M) -> Result<()> {
        let record = model.to_record();
        let response = match kind {
            WriteKind::Create => self.adapter.create::<M>(&record).await,
            WriteKind::Update => self.adapter.update::<M>(&record).await,
        };
        log_write::<M>(kind, response.into_result(M::TYPE_NAME))?;

        self.refresh().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Create,
    Update,
}

fn log_write<M: Model>(kind: WriteKind, result: SyncResult<()>) -> SyncResult<()> {
    match &result {
        Ok(()) => tracing::info!("{kind:?} {} succeeded", M::TYPE_NAME),
        Err(error) => tracing::warn!("{kind:?} {} failed: {}", M::TYPE_NAME, error),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DecodeError, NoteRecord, Passcode};
    use crate::sync::{RemoteError, SyncError, SyncResponse};
    use crate::verification::PasscodeError;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory data service with switchable failures
    #[derive(Default)]
    struct MockAdapter {
        records: Mutex<BTreeMap<&'static str, Vec<Value>>>,
        fail_lists: AtomicBool,
        fail_writes: AtomicBool,
        writes: AtomicUsize,
    }

    impl MockAdapter {
        fn seed_raw(&self, type_name: &'static str, value: Value) {
            self.records
                .lock()
                .unwrap()
                .entry(type_name)
                .or_default()
                .push(value);
        }
    }

    impl RemoteSyncAdapter for MockAdapter {
        async fn list<M: Model>(&self) -> SyncResponse<Vec<M::Record>> {
            if self.fail_lists.load(Ordering::SeqCst) {
                return SyncResponse {
                    data: Some(Vec::new()),
                    errors: vec![RemoteError::new("list failed")],
                };
            }
            let records = self.records.lock().unwrap();
            let items = records
                .get(M::TYPE_NAME)
                .into_iter()
                .flatten()
                .map(|value| serde_json::from_value(value.clone()).unwrap())
                .collect();
            SyncResponse::ok(items)
        }

        async fn create<M: Model>(&self, record: &M::Record) -> SyncResponse<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return SyncResponse::failure(RemoteError::new("write failed"));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut value = serde_json::to_value(record).unwrap();
            value["createdAt"] = Value::String("2024-01-01T10:00:00Z".to_string());
            self.records
                .lock()
                .unwrap()
                .entry(M::TYPE_NAME)
                .or_default()
                .push(value);
            SyncResponse::ok(())
        }

        async fn update<M: Model>(&self, record: &M::Record) -> SyncResponse<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return SyncResponse::failure(RemoteError::new("write failed"));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            let value = serde_json::to_value(record).unwrap();
            let mut records = self.records.lock().unwrap();
            let stored = records.entry(M::TYPE_NAME).or_default();
            if let Some(slot) = stored.iter_mut().find(|stored| stored["id"] == value["id"]) {
                *slot = value;
            }
            SyncResponse::ok(())
        }
    }

    async fn store_with_verifier(passcode: u32) -> (NoteStore<MockAdapter>, NoteId, VerifierId) {
        let store = NoteStore::new(MockAdapter::default());
        let note_id = store.add_note(NoteDraft::new("Quarterly report")).await.unwrap();
        let verifier_id = store
            .add_verifier("Alice", &passcode.to_string())
            .await
            .unwrap();
        (store, note_id, verifier_id)
    }

    #[tokio::test]
    async fn refresh_on_empty_remote_is_no_notes() {
        let store = NoteStore::new(MockAdapter::default());
        let snapshot = store.refresh().await.unwrap();
        assert!(snapshot.notes().is_empty());
        assert!(snapshot.verifiers().is_empty());
    }

    #[tokio::test]
    async fn add_note_refreshes_snapshot() {
        let store = NoteStore::new(MockAdapter::default());
        let mut updates = store.subscribe();

        let id = store
            .add_note(NoteDraft {
                content: "  buy milk  ".to_string(),
                location: Some(Location::new(50.0, 14.0)),
                image: None,
            })
            .await
            .unwrap();

        assert!(updates.has_changed().unwrap());
        let snapshot = updates.borrow_and_update().clone();
        let note = snapshot.find_note(&id).unwrap();
        assert_eq!(note.content, "buy milk");
        assert_eq!(note.location, Some(Location::new(50.0, 14.0)));
        assert!(note.created_at.is_some());
        assert!(note.verified_by.is_empty());
    }

    #[tokio::test]
    async fn add_note_rejects_blank_content() {
        let store = NoteStore::new(MockAdapter::default());
        let error = store.add_note(NoteDraft::new("   ")).await.unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert_eq!(store.adapter().writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let store = NoteStore::new(MockAdapter::default());
        store.add_note(NoteDraft::new("kept")).await.unwrap();
        let before = store.snapshot();

        store.adapter().fail_lists.store(true, Ordering::SeqCst);
        let error = store.refresh().await.unwrap_err();

        assert!(matches!(error, Error::Sync(SyncError::Remote(_))));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn failed_write_leaves_snapshot_unchanged() {
        let store = NoteStore::new(MockAdapter::default());
        store.refresh().await.unwrap();
        let before = store.snapshot();

        store.adapter().fail_writes.store(true, Ordering::SeqCst);
        let error = store.add_note(NoteDraft::new("lost")).await.unwrap_err();

        assert!(matches!(error, Error::Sync(_)));
        assert!(Arc::ptr_eq(&store.snapshot(), &before));
    }

    #[tokio::test]
    async fn malformed_verification_list_aborts_refresh() {
        let store = NoteStore::new(MockAdapter::default());
        store.add_note(NoteDraft::new("good")).await.unwrap();
        let before = store.snapshot();

        store.adapter().seed_raw(
            "Note",
            serde_json::json!({
                "id": NoteId::new().to_string(),
                "content": "bad",
                "verifiedBy": "[not json"
            }),
        );
        let error = store.refresh().await.unwrap_err();

        assert!(matches!(error, Error::Decode(DecodeError::Malformed(_))));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn attach_image_sends_full_replacement() {
        let store = NoteStore::new(MockAdapter::default());
        let id = store
            .add_note(NoteDraft {
                content: "site visit".to_string(),
                location: Some(Location::new(1.5, 2.5)),
                image: None,
            })
            .await
            .unwrap();

        store.attach_image(&id, vec![0xff, 0xd8]).await.unwrap();

        let note = store.snapshot().find_note(&id).cloned().unwrap();
        assert_eq!(note.image, Some(vec![0xff, 0xd8]));
        assert_eq!(note.location, Some(Location::new(1.5, 2.5)));
        assert_eq!(note.content, "site visit");
    }

    #[tokio::test]
    async fn attach_image_to_unknown_note_is_not_found() {
        let store = NoteStore::new(MockAdapter::default());
        let error = store.attach_image(&NoteId::new(), vec![1]).await.unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn add_verifier_validates_passcode() {
        let store = NoteStore::new(MockAdapter::default());

        let error = store.add_verifier("Bob", "000001").await.unwrap_err();
        assert!(matches!(error, Error::Passcode(PasscodeError::OutOfRange)));
        let error = store.add_verifier("  ", "123456").await.unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));

        let id = store.add_verifier(" Bob ", "123456").await.unwrap();
        let snapshot = store.snapshot();
        let verifier = snapshot.find_verifier(&id).unwrap();
        assert_eq!(verifier.name, "Bob");
        assert_eq!(verifier.passcode, Passcode::new(123_456).unwrap());
    }

    #[tokio::test]
    async fn verify_records_verifier_once() {
        let (store, note_id, verifier_id) = store_with_verifier(123_456).await;

        store.verify(&note_id, &verifier_id, "123456").await.unwrap();
        let writes_after_first = store.adapter().writes.load(Ordering::SeqCst);
        store.verify(&note_id, &verifier_id, "123456").await.unwrap();

        assert_eq!(store.adapter().writes.load(Ordering::SeqCst), writes_after_first);
        let note = store.snapshot().find_note(&note_id).cloned().unwrap();
        assert_eq!(note.verified_by.iter().copied().collect::<Vec<_>>(), vec![verifier_id]);
    }

    #[tokio::test]
    async fn verify_with_wrong_passcode_changes_nothing() {
        let (store, note_id, verifier_id) = store_with_verifier(123_456).await;
        let before = store.snapshot();

        let error = store.verify(&note_id, &verifier_id, "654321").await.unwrap_err();
        assert!(matches!(error, Error::Passcode(PasscodeError::Mismatch)));
        let error = store.verify(&note_id, &verifier_id, "12345").await.unwrap_err();
        assert!(matches!(error, Error::Passcode(PasscodeError::WrongLength)));

        assert!(Arc::ptr_eq(&store.snapshot(), &before));
    }

    #[tokio::test]
    async fn verify_unknown_verifier_is_not_found() {
        let (store, note_id, _) = store_with_verifier(123_456).await;
        let error = store
            .verify(&note_id, &VerifierId::new(), "123456")
            .await
            .unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn update_keeps_server_assigned_created_at() {
        let store = NoteStore::new(MockAdapter::default());
        let id = store.add_note(NoteDraft::new("stamp")).await.unwrap();
        let created_at = store.snapshot().find_note(&id).unwrap().created_at;

        let mut note = store.snapshot().find_note(&id).cloned().unwrap();
        note.is_done = true;
        store.update(&note).await.unwrap();

        let stored = store.snapshot().find_note(&id).cloned().unwrap();
        assert!(stored.is_done);
        assert_eq!(stored.created_at, created_at);
        assert_eq!(NoteRecord::from(&stored).id, id);
    }
}
