use std::sync::Arc;

use diver_backends::TocUpdatingBackend;
use diver_repo::RepositoryChain;
use diver_storage::Backend;
use diver_toc::{TocError, TopTocService, XmlTopTocService};

struct Tier {
    backend: Arc<dyn Backend>,
    writable_cache: bool,
}

/// Convenience assembler for a [`RepositoryChain`] (new in this crate; not
/// part of spec.md, which specifies the chain's read/write contract but
/// leaves wiring it up to the caller). Tiers are added in read-order; each
/// is marked as a write-back cache tier or not, mirroring spec.md §4.H's
/// `storages` / `writableStorages` split.
#[derive(Default)]
pub struct RepositoryBuilder {
    tiers: Vec<Tier>,
    cache_remote_content: bool,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        Self {
            tiers: Vec::new(),
            cache_remote_content: true,
        }
    }

    /// Adds a read tier. If `backend.is_writable()`, it also participates in
    /// write-back caching for hits from later, lower-priority tiers.
    pub fn with_tier(mut self, backend: Arc<dyn Backend>) -> Self {
        let writable_cache = backend.is_writable();
        self.tiers.push(Tier { backend, writable_cache });
        self
    }

    /// Adds a read tier that never receives write-back, even if it happens
    /// to be writable (e.g. a writable backend kept read-only for this
    /// particular chain).
    pub fn with_read_only_tier(mut self, backend: Arc<dyn Backend>) -> Self {
        self.tiers.push(Tier {
            backend,
            writable_cache: false,
        });
        self
    }

    /// Sets `cacheRemoteContent` (spec.md §4.H); defaults to `true`.
    pub fn cache_remote_content(mut self, enabled: bool) -> Self {
        self.cache_remote_content = enabled;
        self
    }

    pub fn build(self) -> RepositoryChain {
        let writable_indices = self
            .tiers
            .iter()
            .enumerate()
            .filter(|(_, tier)| tier.writable_cache && tier.backend.is_writable())
            .map(|(index, _)| index)
            .collect();
        let storages = self.tiers.into_iter().map(|tier| tier.backend).collect();
        RepositoryChain::new(storages, writable_indices, self.cache_remote_content)
    }
}

/// Wraps `inner` with ToC maintenance (spec.md §4.F "Enabling ToC updates"),
/// rooting the repository-wide top-ToC (spec.md §4.G) on the same backend.
/// This is the common case: one backend owns both the payload objects and
/// the two ToC documents describing them.
pub fn backend_with_toc_updates(inner: Arc<dyn Backend>) -> Result<TocUpdatingBackend, TocError> {
    let top_toc: Arc<dyn TopTocService> = Arc::new(XmlTopTocService::new(inner.clone())?);
    Ok(TocUpdatingBackend::new(inner, top_toc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use diver_backends::MemoryBackend;
    use diver_storage::StorageKey;
    use rstest::rstest;

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    fn write_back_follows_cache_remote_content_flag(#[case] cache_remote_content: bool, #[case] expect_cached: bool) {
        let remote: Arc<dyn Backend> = Arc::new(MemoryBackend::new_readonly(
            "remote",
            [("a/b".to_string(), b"payload".to_vec())],
        ));
        let cache: Arc<dyn Backend> = Arc::new(MemoryBackend::new_writable("cache", false));
        let chain = RepositoryBuilder::new()
            .with_tier(cache.clone())
            .with_tier(remote)
            .cache_remote_content(cache_remote_content)
            .build();

        let key = StorageKey::from_raw_path("a/b").unwrap();
        chain.read(&key).unwrap();
        assert_eq!(cache.read(&key).unwrap().is_some(), expect_cached);
    }

    #[test]
    fn builder_marks_writable_backends_as_cache_tiers() {
        let remote: Arc<dyn Backend> = Arc::new(MemoryBackend::new_readonly(
            "remote",
            [("a/b".to_string(), b"payload".to_vec())],
        ));
        let cache: Arc<dyn Backend> = Arc::new(MemoryBackend::new_writable("cache", false));
        let chain = RepositoryBuilder::new()
            .with_tier(cache.clone())
            .with_tier(remote)
            .build();

        let key = StorageKey::from_raw_path("a/b").unwrap();
        chain.read(&key).unwrap();
        assert!(cache.read(&key).unwrap().is_some());
    }

    #[test]
    fn read_only_tier_never_receives_write_back() {
        let remote: Arc<dyn Backend> = Arc::new(MemoryBackend::new_readonly(
            "remote",
            [("a/b".to_string(), b"payload".to_vec())],
        ));
        let writable: Arc<dyn Backend> = Arc::new(MemoryBackend::new_writable("cache", false));
        let chain = RepositoryBuilder::new()
            .with_read_only_tier(writable.clone())
            .with_tier(remote)
            .build();

        let key = StorageKey::from_raw_path("a/b").unwrap();
        chain.read(&key).unwrap();
        assert!(writable.read(&key).unwrap().is_none());
    }

    #[test]
    fn backend_with_toc_updates_wires_artifact_and_top_toc() {
        use diver_coordinate::Coordinate;

        let inner: Arc<dyn Backend> = Arc::new(MemoryBackend::new_writable("mem", false));
        let wrapped = backend_with_toc_updates(inner.clone()).unwrap();
        let coordinate = Coordinate::parse("com.ecosio:test-artefact:1.0.0").unwrap();
        let key = StorageKey::for_artifact(&coordinate, ".jar");
        wrapped.write(&key, b"payload").unwrap();

        let toc_key = StorageKey::toc("com.ecosio", "test-artefact");
        assert!(inner.exists(&toc_key).unwrap());
    }
}
