use dashmap::DashMap;
use diver_storage::{Backend, BackendError, StorageKey};

/// A backend that keeps its entire store in memory, useful for tests and as
/// a fast read-through cache tier (spec.md §4.E "In-memory").
pub struct MemoryBackend {
    id: String,
    store: DashMap<String, Vec<u8>>,
    writable: bool,
    deletable: bool,
    allow_overwrite: bool,
}

impl MemoryBackend {
    /// A writable, deletable backend that starts empty. Overwrites of an
    /// existing payload are rejected unless `allow_overwrite` is set.
    pub fn new_writable(id: impl Into<String>, allow_overwrite: bool) -> Self {
        Self {
            id: id.into(),
            store: DashMap::new(),
            writable: true,
            deletable: true,
            allow_overwrite,
        }
    }

    /// A read-only backend pre-populated with `entries` at construction
    /// time. Construction-time registration is always allowed to overwrite
    /// (spec.md §4.E), but since the backend is not writable afterwards this
    /// only matters for the initial population.
    pub fn new_readonly(id: impl Into<String>, entries: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        let store = DashMap::new();
        for (key, value) in entries {
            store.insert(key, value);
        }
        Self {
            id: id.into(),
            store,
            writable: false,
            deletable: false,
            allow_overwrite: true,
        }
    }
}

impl Backend for MemoryBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn is_deletable(&self) -> bool {
        self.deletable
    }

    fn allow_overwrite(&self) -> bool {
        self.allow_overwrite
    }

    fn exists_raw(&self, key: &StorageKey) -> Result<bool, BackendError> {
        Ok(self.store.contains_key(key.path()))
    }

    fn read_raw(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.store.get(key.path()).map(|entry| entry.value().clone()))
    }

    fn write_raw(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError> {
        self.store.insert(key.path().to_string(), content.to_vec());
        Ok(())
    }

    fn delete_raw(&self, key: &StorageKey) -> Result<(), BackendError> {
        self.store.remove(key.path());
        Ok(())
    }
}
