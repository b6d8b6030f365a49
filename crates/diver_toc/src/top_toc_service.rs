use std::sync::Arc;

use diver_storage::{Backend, StorageKey};
use parking_lot::Mutex;

use crate::error::TocError;
use crate::top_toc::TopToc;

/// The injected service a [`Backend`] consults to keep the repository-wide
/// top-ToC up to date (spec.md §4.G). Kept separate from [`Backend`] itself
/// so a backend with ToC updates disabled can be wired to a no-op
/// implementation with zero overhead.
pub trait TopTocService: Send + Sync {
    fn register_group_and_artifact(&self, group_id: &str, artifact_id: &str) -> Result<(), TocError>;

    fn contains_group_and_artifact(&self, group_id: &str, artifact_id: &str) -> Result<bool, TocError>;

    fn remove_artifact(&self, group_id: &str, artifact_id: &str) -> Result<(), TocError>;

    fn iterate_all_top_level_group_names(&self) -> Result<Vec<String>, TocError>;

    fn iterate_all_subgroups(&self, group_id: &str, recursive: bool) -> Result<Vec<String>, TocError>;

    fn iterate_all_artifacts(&self, group_id: &str) -> Result<Vec<String>, TocError>;
}

/// A [`TopTocService`] that tracks nothing, for backends with ToC updates
/// disabled (spec.md §4.F "EnableTocUpdates").
#[derive(Debug, Default)]
pub struct NoOpTopTocService;

impl TopTocService for NoOpTopTocService {
    fn register_group_and_artifact(&self, _group_id: &str, _artifact_id: &str) -> Result<(), TocError> {
        Ok(())
    }

    fn contains_group_and_artifact(&self, _group_id: &str, _artifact_id: &str) -> Result<bool, TocError> {
        Ok(false)
    }

    fn remove_artifact(&self, _group_id: &str, _artifact_id: &str) -> Result<(), TocError> {
        Ok(())
    }

    fn iterate_all_top_level_group_names(&self) -> Result<Vec<String>, TocError> {
        Ok(Vec::new())
    }

    fn iterate_all_subgroups(&self, _group_id: &str, _recursive: bool) -> Result<Vec<String>, TocError> {
        Ok(Vec::new())
    }

    fn iterate_all_artifacts(&self, _group_id: &str) -> Result<Vec<String>, TocError> {
        Ok(Vec::new())
    }
}

/// A [`TopTocService`] backed by the XML top-ToC document stored on a
/// [`Backend`]. Mutations are serialized with a single mutex, matching the
/// "repo-wide mutex" requirement in spec.md §5 — the top-ToC is shared by
/// every artifact in the repository, unlike the per-artifact ToC lock.
pub struct XmlTopTocService {
    backend: Arc<dyn Backend>,
    state: Mutex<TopToc>,
}

impl XmlTopTocService {
    /// Loads the persisted top-ToC from `backend`, or starts empty if none
    /// has been written yet. This is the `InitForRepo` step of spec.md §4.G.
    pub fn new(backend: Arc<dyn Backend>) -> Result<Self, TocError> {
        let key = StorageKey::top_toc();
        let state = match backend.read(&key)? {
            Some(item) => TopToc::from_xml(&String::from_utf8_lossy(&item.bytes))?,
            None => TopToc::new(),
        };
        Ok(Self {
            backend,
            state: Mutex::new(state),
        })
    }

    fn persist(&self, toc: &TopToc) -> Result<(), TocError> {
        let xml = toc.to_xml()?;
        self.backend.write(&StorageKey::top_toc(), xml.as_bytes())?;
        Ok(())
    }
}

impl TopTocService for XmlTopTocService {
    fn register_group_and_artifact(&self, group_id: &str, artifact_id: &str) -> Result<(), TocError> {
        let mut guard = self.state.lock();
        if guard.contains_group_and_artifact(group_id, artifact_id) {
            return Ok(());
        }
        guard.register_group_and_artifact(group_id, artifact_id);
        self.persist(&guard)
    }

    fn contains_group_and_artifact(&self, group_id: &str, artifact_id: &str) -> Result<bool, TocError> {
        Ok(self.state.lock().contains_group_and_artifact(group_id, artifact_id))
    }

    fn remove_artifact(&self, group_id: &str, artifact_id: &str) -> Result<(), TocError> {
        let mut guard = self.state.lock();
        if !guard.contains_group_and_artifact(group_id, artifact_id) {
            return Ok(());
        }
        guard.remove_artifact(group_id, artifact_id);
        self.persist(&guard)
    }

    fn iterate_all_top_level_group_names(&self) -> Result<Vec<String>, TocError> {
        Ok(self.state.lock().iterate_all_top_level_group_names())
    }

    fn iterate_all_subgroups(&self, group_id: &str, recursive: bool) -> Result<Vec<String>, TocError> {
        Ok(self.state.lock().iterate_all_subgroups(group_id, recursive))
    }

    fn iterate_all_artifacts(&self, group_id: &str) -> Result<Vec<String>, TocError> {
        Ok(self.state.lock().iterate_all_artifacts(group_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diver_storage::BackendError;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    /// A minimal in-memory [`Backend`] used only to exercise
    /// [`XmlTopTocService`] without depending on `diver_backends`.
    struct FakeBackend {
        store: StdMutex<HashMap<String, Vec<u8>>>,
    }

    impl FakeBackend {
        fn new() -> Self {
            Self {
                store: StdMutex::new(HashMap::new()),
            }
        }
    }

    impl Backend for FakeBackend {
        fn id(&self) -> &str {
            "fake"
        }

        fn backend_type(&self) -> &'static str {
            "fake"
        }

        fn is_writable(&self) -> bool {
            true
        }

        fn is_deletable(&self) -> bool {
            true
        }

        fn exists_raw(&self, key: &StorageKey) -> Result<bool, BackendError> {
            Ok(self.store.lock().unwrap().contains_key(key.path()))
        }

        fn read_raw(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, BackendError> {
            Ok(self.store.lock().unwrap().get(key.path()).cloned())
        }

        fn write_raw(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError> {
            self.store
                .lock()
                .unwrap()
                .insert(key.path().to_string(), content.to_vec());
            Ok(())
        }

        fn delete_raw(&self, key: &StorageKey) -> Result<(), BackendError> {
            self.store.lock().unwrap().remove(key.path());
            Ok(())
        }
    }

    #[test]
    fn register_persists_and_reloads() {
        let backend = Arc::new(FakeBackend::new());
        let service = XmlTopTocService::new(backend.clone()).unwrap();
        service.register_group_and_artifact("com.ecosio", "a").unwrap();
        assert!(service.contains_group_and_artifact("com.ecosio", "a").unwrap());

        let reloaded = XmlTopTocService::new(backend).unwrap();
        assert!(reloaded.contains_group_and_artifact("com.ecosio", "a").unwrap());
    }

    #[test]
    fn remove_of_unknown_artifact_is_a_no_op() {
        let backend = Arc::new(FakeBackend::new());
        let service = XmlTopTocService::new(backend).unwrap();
        service.remove_artifact("com.ecosio", "missing").unwrap();
        assert!(!service.contains_group_and_artifact("com.ecosio", "missing").unwrap());
    }
}
