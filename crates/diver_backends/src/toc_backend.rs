use std::sync::Arc;

use dashmap::DashMap;
use diver_storage::{Backend, BackendError, StorageKey};
use diver_toc::{load_artifact_toc, save_artifact_toc, NoOpTopTocService, TopTocService};
use parking_lot::Mutex;

/// Recovers `(group_id, artifact_id, version_string)` from a data-object
/// key's canonical layout (spec.md §6):
/// `<group>/<artifact>/<version>/<artifact>-<version><ext>`. Returns `None`
/// for keys that do not match this shape (e.g. ToC documents themselves).
fn parse_artifact_location(path: &str) -> Option<(String, String, String)> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 4 {
        return None;
    }
    let filename = segments[segments.len() - 1];
    let version_dir = segments[segments.len() - 2];
    let artifact_id = segments[segments.len() - 3];
    let group_segments = &segments[..segments.len() - 3];
    if group_segments.is_empty() || group_segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    let expected_prefix = format!("{artifact_id}-{version_dir}");
    if !filename.starts_with(&expected_prefix) {
        return None;
    }
    Some((group_segments.join("."), artifact_id.to_string(), version_dir.to_string()))
}

/// Wraps any [`Backend`] so that every successful payload `Write`/`Delete`
/// also maintains the per-artifact ToC and the repository-wide top-ToC
/// (spec.md §4.F). Raw reads and capability flags pass straight through to
/// the inner backend; only `write`/`delete` gain ToC side effects.
///
/// Per spec.md §5, ToC read-modify-write sequences for the same
/// `(group, artifact)` are serialised with a per-artifact mutex; the
/// top-ToC itself is serialised inside `top_toc` (repo-wide mutex).
pub struct TocUpdatingBackend {
    inner: Arc<dyn Backend>,
    top_toc: Arc<dyn TopTocService>,
    artifact_locks: DashMap<(String, String), Arc<Mutex<()>>>,
}

impl TocUpdatingBackend {
    pub fn new(inner: Arc<dyn Backend>, top_toc: Arc<dyn TopTocService>) -> Self {
        Self {
            inner,
            top_toc,
            artifact_locks: DashMap::new(),
        }
    }

    /// Wraps `inner` with ToC updates disabled: a [`NoOpTopTocService`] and
    /// no per-artifact ToC maintenance is performed by this wrapper at all,
    /// matching spec.md §4.F's `EnableTocUpdates=false` backends.
    pub fn without_toc_updates(inner: Arc<dyn Backend>) -> Self {
        Self {
            inner,
            top_toc: Arc::new(NoOpTopTocService),
            artifact_locks: DashMap::new(),
        }
    }

    fn lock_for(&self, group_id: &str, artifact_id: &str) -> Arc<Mutex<()>> {
        self.artifact_locks
            .entry((group_id.to_string(), artifact_id.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn on_write(&self, key: &StorageKey) -> Result<(), BackendError> {
        if key.is_artifact_toc() || key.is_top_toc() {
            return Ok(());
        }
        let Some((group_id, artifact_id, version_str)) = parse_artifact_location(key.path()) else {
            return Ok(());
        };
        let version = match diver_coordinate::Version::parse(&version_str) {
            Ok(v) => v,
            Err(_) => return Ok(()),
        };
        let lock = self.lock_for(&group_id, &artifact_id);
        let _guard = lock.lock();
        let mut toc = load_artifact_toc(self.inner.as_ref(), &group_id, &artifact_id)
            .map_err(|err| BackendError::transport(self.inner.id(), err.to_string()))?;
        toc.add(version, now_utc());
        save_artifact_toc(self.inner.as_ref(), &toc).map_err(|err| BackendError::transport(self.inner.id(), err.to_string()))?;
        self.top_toc
            .register_group_and_artifact(&group_id, &artifact_id)
            .map_err(|err| BackendError::transport(self.inner.id(), err.to_string()))?;
        tracing::debug!(backend = self.inner.id(), group_id, artifact_id, "updated artifact toc after write");
        Ok(())
    }

    fn on_delete(&self, key: &StorageKey) -> Result<(), BackendError> {
        if key.is_artifact_toc() || key.is_top_toc() {
            return Ok(());
        }
        let Some((group_id, artifact_id, version_str)) = parse_artifact_location(key.path()) else {
            return Ok(());
        };
        let version = match diver_coordinate::Version::parse(&version_str) {
            Ok(v) => v,
            Err(_) => return Ok(()),
        };
        let lock = self.lock_for(&group_id, &artifact_id);
        let _guard = lock.lock();
        let mut toc = load_artifact_toc(self.inner.as_ref(), &group_id, &artifact_id)
            .map_err(|err| BackendError::transport(self.inner.id(), err.to_string()))?;
        if !toc.contains(&version) {
            return Ok(());
        }
        toc.remove(&version);
        save_artifact_toc(self.inner.as_ref(), &toc).map_err(|err| BackendError::transport(self.inner.id(), err.to_string()))?;
        if toc.is_empty() {
            self.top_toc
                .remove_artifact(&group_id, &artifact_id)
                .map_err(|err| BackendError::transport(self.inner.id(), err.to_string()))?;
            tracing::debug!(backend = self.inner.id(), group_id, artifact_id, "last version removed; cleared artifact from top toc");
        }
        Ok(())
    }
}

fn now_utc() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

impl Backend for TocUpdatingBackend {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn backend_type(&self) -> &'static str {
        self.inner.backend_type()
    }

    fn is_writable(&self) -> bool {
        self.inner.is_writable()
    }

    fn is_deletable(&self) -> bool {
        self.inner.is_deletable()
    }

    fn allow_overwrite(&self) -> bool {
        self.inner.allow_overwrite()
    }

    fn exists_raw(&self, key: &StorageKey) -> Result<bool, BackendError> {
        self.inner.exists_raw(key)
    }

    fn read_raw(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, BackendError> {
        self.inner.read_raw(key)
    }

    fn write_raw(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError> {
        self.inner.write_raw(key, content)
    }

    fn delete_raw(&self, key: &StorageKey) -> Result<(), BackendError> {
        self.inner.delete_raw(key)
    }

    /// Delegates to the inner backend's full write (payload + sidecar),
    /// then performs the ToC maintenance described in spec.md §4.F. Per the
    /// **failure policy** there, a ToC update failure is reported to the
    /// caller even though the payload write already succeeded and is not
    /// rolled back.
    fn write(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError> {
        self.inner.write(key, content)?;
        self.on_write(key)
    }

    fn delete(&self, key: &StorageKey) -> Result<(), BackendError> {
        self.inner.delete(key)?;
        self.on_delete(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use diver_coordinate::Coordinate;
    use diver_storage::StorageKey;
    use diver_toc::XmlTopTocService;
    use rstest::rstest;

    #[rstest]
    #[case("com/ecosio/test-artefact/1.2/test-artefact-1.2.xml", Some(("com.ecosio", "test-artefact", "1.2")))]
    #[case("a/b/4/b-4.xyz", Some(("a.b", "b", "4")))]
    #[case("com/ecosio/test-artefact/_toc.xml", None)]
    #[case("short/path", None)]
    #[case("com/ecosio/test-artefact/1.2/other-1.2.xml", None)]
    fn parses_artifact_location_from_key_path(#[case] path: &str, #[case] expected: Option<(&str, &str, &str)>) {
        let actual = parse_artifact_location(path);
        let expected = expected.map(|(g, a, v)| (g.to_string(), a.to_string(), v.to_string()));
        assert_eq!(actual, expected);
    }

    fn fixture() -> (Arc<MemoryBackend>, TocUpdatingBackend) {
        let inner = Arc::new(MemoryBackend::new_writable("mem", false));
        let top_toc = Arc::new(XmlTopTocService::new(inner.clone()).unwrap());
        let wrapped = TocUpdatingBackend::new(inner.clone(), top_toc);
        (inner, wrapped)
    }

    #[test]
    fn write_populates_artifact_and_top_toc() {
        let (inner, backend) = fixture();
        let coordinate = Coordinate::parse("com.ecosio:test-artefact:1.0.0").unwrap();
        let key = StorageKey::for_artifact(&coordinate, ".jar");
        backend.write(&key, b"payload").unwrap();

        let toc = load_artifact_toc(inner.as_ref(), "com.ecosio", "test-artefact").unwrap();
        assert_eq!(toc.len(), 1);
        assert!(toc.contains(&coordinate.version().clone()));
    }

    #[test]
    fn delete_removes_version_and_empty_toc_clears_top_toc() {
        let (inner, backend) = fixture();
        let coordinate = Coordinate::parse("com.ecosio:test-artefact:1.0.0").unwrap();
        let key = StorageKey::for_artifact(&coordinate, ".jar");
        backend.write(&key, b"payload").unwrap();
        backend.delete(&key).unwrap();

        let toc = load_artifact_toc(inner.as_ref(), "com.ecosio", "test-artefact").unwrap();
        assert!(toc.is_empty());

        let top_toc = XmlTopTocService::new(inner.clone()).unwrap();
        assert!(!top_toc
            .contains_group_and_artifact("com.ecosio", "test-artefact")
            .unwrap());
    }

    #[test]
    fn toc_document_writes_do_not_recurse_into_toc_maintenance() {
        let (inner, backend) = fixture();
        let key = StorageKey::toc("com.ecosio", "test-artefact");
        backend.write(&key, b"<repotoc/>").unwrap();
        assert!(inner.exists(&key).unwrap());
    }

    #[tracing_test::traced_test]
    #[test]
    fn write_and_delete_log_toc_maintenance() {
        let (_, backend) = fixture();
        let coordinate = Coordinate::parse("com.ecosio:test-artefact:1.0.0").unwrap();
        let key = StorageKey::for_artifact(&coordinate, ".jar");
        backend.write(&key, b"payload").unwrap();
        assert!(logs_contain("updated artifact toc after write"));

        backend.delete(&key).unwrap();
        assert!(logs_contain("cleared artifact from top toc"));
    }
}
