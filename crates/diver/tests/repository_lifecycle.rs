use std::sync::Arc;

use diver::prelude::*;
use diver::{XmlTopTocService, load_artifact_toc};
use tempfile::tempdir;

/// End-to-end: write two versions of an artifact through a ToC-updating
/// local filesystem backend, read them back verified, delete one, and
/// check both the per-artifact and top-level ToC reflect the change
/// (spec.md §8 scenario 6, "ToC lifecycle").
#[test]
fn toc_lifecycle_through_a_local_fs_backend() {
    let dir = tempdir().unwrap();
    let fs: Arc<dyn Backend> = Arc::new(LocalFsBackend::new("fs", dir.path(), true, true, false));
    let backend = Arc::new(backend_with_toc_updates(fs).unwrap());

    let v1 = Coordinate::parse("com.ecosio:test-artefact:1.0.0").unwrap();
    let v2 = Coordinate::parse("com.ecosio:test-artefact:1.1.0").unwrap();
    let key1 = StorageKey::for_artifact(&v1, ".jar");
    let key2 = StorageKey::for_artifact(&v2, ".jar");

    backend.write(&key1, b"payload-1.0.0").unwrap();
    backend.write(&key2, b"payload-1.1.0").unwrap();

    let toc_key = StorageKey::toc("com.ecosio", "test-artefact");
    let toc = load_artifact_toc(backend.as_ref(), "com.ecosio", "test-artefact").unwrap();
    assert_eq!(toc.len(), 2);
    assert_eq!(toc.latest().unwrap(), &Version::parse("1.1.0").unwrap());
    assert!(backend.exists(&toc_key).unwrap());

    backend.delete(&key2).unwrap();
    let toc = load_artifact_toc(backend.as_ref(), "com.ecosio", "test-artefact").unwrap();
    assert_eq!(toc.len(), 1);
    assert_eq!(toc.latest().unwrap(), &Version::parse("1.0.0").unwrap());

    backend.delete(&key1).unwrap();
    let toc = load_artifact_toc(backend.as_ref(), "com.ecosio", "test-artefact").unwrap();
    assert!(toc.is_empty());

    let top_toc = XmlTopTocService::new(backend.clone()).unwrap();
    assert!(!top_toc
        .contains_group_and_artifact("com.ecosio", "test-artefact")
        .unwrap());
}

/// End-to-end: a three-tier chain (in-memory, local filesystem, a
/// read-only remote) with `cacheRemoteContent` enabled back-fills every
/// writable tier on a remote hit (spec.md §8 scenario 5).
#[test]
fn chain_read_through_populates_writable_tiers() {
    let dir = tempdir().unwrap();
    let in_memory: Arc<dyn Backend> = Arc::new(MemoryBackend::new_writable("mem", false));
    let local_fs: Arc<dyn Backend> = Arc::new(LocalFsBackend::new("fs", dir.path(), true, true, false));
    let remote: Arc<dyn Backend> = Arc::new(MemoryBackend::new_readonly(
        "remote",
        [("a/b".to_string(), b"This file is on HTTP native".to_vec())],
    ));

    let chain = RepositoryBuilder::new()
        .with_tier(in_memory.clone())
        .with_tier(local_fs.clone())
        .with_read_only_tier(remote)
        .build();

    let key = StorageKey::from_raw_path("a/b").unwrap();
    let item = chain.read(&key).unwrap().unwrap();
    assert_eq!(item.bytes, b"This file is on HTTP native");
    assert_eq!(item.hash_state, HashState::NotVerified);

    let cached = in_memory.read(&key).unwrap().unwrap();
    assert_eq!(cached.bytes, item.bytes);
    assert_eq!(cached.hash_state, HashState::VerifiedMatching);

    let cached_fs = local_fs.read(&key).unwrap().unwrap();
    assert_eq!(cached_fs.bytes, item.bytes);
    assert_eq!(cached_fs.hash_state, HashState::VerifiedMatching);
}
