//! Best-effort durable copy of the wizard so a seller can resume after a
//! reload or crash. Nothing here returns an error: a snapshot that cannot be
//! read is simply absent, and a write that fails is dropped.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::draft::ListingDraft;
use super::steps::WizardStep;

pub const DRAFT_STORAGE_KEY: &str = "listing-draft";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedSnapshot {
    #[serde(rename = "form")]
    pub draft: ListingDraft,
    pub step: WizardStep,
}

impl PersistedSnapshot {
    /// Parses stored text. Anything without an object-valued `form` is
    /// discarded; an unusable `step` resumes at the first step.
    pub fn decode(raw: &str) -> Option<Self> {
        let mut value: Value = serde_json::from_str(raw).ok()?;
        let form = value.get_mut("form").map(Value::take)?;
        let draft = ListingDraft::from_json(form).ok()?;
        let step = value
            .get("step")
            .and_then(Value::as_u64)
            .and_then(|number| u8::try_from(number).ok())
            .and_then(WizardStep::from_number)
            .unwrap_or(WizardStep::FIRST);
        Some(Self { draft, step })
    }

    pub fn encode(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Option<PersistedSnapshot>;
    fn persist(&self, snapshot: &PersistedSnapshot);
    fn clear(&self);
}

impl<T> SnapshotStore for Arc<T>
where
    T: SnapshotStore + ?Sized,
{
    fn load(&self) -> Option<PersistedSnapshot> {
        (**self).load()
    }

    fn persist(&self, snapshot: &PersistedSnapshot) {
        (**self).persist(snapshot)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_key(dir, DRAFT_STORAGE_KEY)
    }

    pub fn with_key(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, contents: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, contents)?;
        std::fs::rename(&staging, &self.path)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Option<PersistedSnapshot> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "no listing draft snapshot");
                return None;
            }
        };
        let snapshot = PersistedSnapshot::decode(&raw);
        if snapshot.is_none() {
            debug!(path = %self.path.display(), "discarding unreadable listing draft snapshot");
        }
        snapshot
    }

    fn persist(&self, snapshot: &PersistedSnapshot) {
        let Some(encoded) = snapshot.encode() else {
            return;
        };
        if let Err(err) = self.write(&encoded) {
            debug!(path = %self.path.display(), error = %err, "listing draft snapshot not written");
        }
    }

    fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "listing draft snapshot not removed")
            }
        }
    }
}

/// Process-local store, mostly for tests and the CLI demo.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Option<PersistedSnapshot> {
        self.slot().as_deref().and_then(PersistedSnapshot::decode)
    }

    fn persist(&self, snapshot: &PersistedSnapshot) {
        if let Some(encoded) = snapshot.encode() {
            *self.slot() = Some(encoded);
        }
    }

    fn clear(&self) {
        *self.slot() = None;
    }
}

/// Used where no durable store exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSnapshotStore;

impl SnapshotStore for DisabledSnapshotStore {
    fn load(&self) -> Option<PersistedSnapshot> {
        None
    }

    fn persist(&self, _snapshot: &PersistedSnapshot) {}

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(step: WizardStep) -> PersistedSnapshot {
        PersistedSnapshot {
            draft: ListingDraft::skeleton(),
            step,
        }
    }

    #[test]
    fn malformed_json_loads_as_absent() {
        let store = MemorySnapshotStore::with_raw("{\"form\": {\"context\":");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn snapshot_without_form_is_absent() {
        let store = MemorySnapshotStore::with_raw(json!({ "step": 3 }).to_string());
        assert_eq!(store.load(), None);

        let store = MemorySnapshotStore::with_raw(json!({ "form": "oops", "step": 3 }).to_string());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn unusable_step_resumes_at_start() {
        let raw = json!({ "form": { "meta": { "title": "Kept" } }, "step": 42 }).to_string();
        let loaded = MemorySnapshotStore::with_raw(raw).load().expect("form present");
        assert_eq!(loaded.step, WizardStep::BasicDetails);
        assert_eq!(loaded.draft.text("meta.title"), Some("Kept"));
    }

    #[test]
    fn stored_shape_uses_form_and_step_keys() {
        let store = MemorySnapshotStore::default();
        store.persist(&snapshot(WizardStep::Pricing));
        let raw: Value = serde_json::from_str(&store.raw().expect("written")).expect("json");
        assert_eq!(raw["step"], json!(5));
        assert_eq!(raw["form"]["context"]["listingType"], json!("SALE"));
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSnapshotStore::new(dir.path().join("nested"));

        assert_eq!(store.load(), None);
        store.persist(&snapshot(WizardStep::Amenities));
        assert_eq!(store.load(), Some(snapshot(WizardStep::Amenities)));

        store.clear();
        assert_eq!(store.load(), None);
        store.clear();
    }

    #[test]
    fn file_store_swallows_unwritable_location() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("write blocker");
        let store = FileSnapshotStore::new(blocker.join("drafts"));

        store.persist(&snapshot(WizardStep::Location));

        assert_eq!(store.load(), None);
    }

    #[test]
    fn disabled_store_never_yields_snapshots() {
        let store = DisabledSnapshotStore;
        store.persist(&snapshot(WizardStep::Review));
        assert_eq!(store.load(), None);
    }
}
