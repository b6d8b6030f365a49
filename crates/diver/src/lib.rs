//! `diver` is a versioned artifact repository library: it stores, retrieves,
//! and indexes immutable named binary artifacts identified by a Maven-style
//! coordinate (`group:artifact:version[:classifier]`).
//!
//! The library does not prescribe a single storage backend. Instead it
//! defines a uniform [`diver_storage::Backend`] abstraction and composes
//! concrete backends ([`diver_backends::MemoryBackend`],
//! [`diver_backends::LocalFsBackend`], [`diver_backends::HttpBackend`],
//! [`diver_backends::ObjectStoreBackend`]) into a prioritised
//! [`diver_repo::RepositoryChain`] with read-through caching and
//! content-integrity verification. Two XML sidecar documents — a
//! per-artifact version list ([`diver_toc::ArtifactToc`]) and a
//! repository-wide group/artifact tree ([`diver_toc::TopToc`]) — are kept
//! coherent with object writes and deletes by
//! [`diver_backends::TocUpdatingBackend`].
//!
//! This crate is a thin facade: it re-exports the workspace's focused
//! crates under one name and adds [`RepositoryBuilder`], a convenience not
//! specified by the underlying design but natural given Rust's builder
//! idiom for assembling a multi-tier chain.
//!
//! ```
//! use std::sync::Arc;
//! use diver::prelude::*;
//!
//! let cache = Arc::new(MemoryBackend::new_writable("cache", false));
//! let chain = RepositoryBuilder::new().with_tier(cache).build();
//!
//! let coordinate = Coordinate::parse("com.ecosio:test-artefact:1.2.0").unwrap();
//! let key = StorageKey::for_artifact(&coordinate, ".txt");
//! chain.write(&key, b"hello").unwrap();
//! assert_eq!(chain.read(&key).unwrap().unwrap().bytes, b"hello");
//! ```

mod builder;

pub use builder::{backend_with_toc_updates, RepositoryBuilder};

pub use diver_backends::{
    resolve_path, HttpBackend, LocalFsBackend, MemoryBackend, ObjectStoreBackend,
    ObjectStoreConfigError, S3Config, TocUpdatingBackend,
};
pub use diver_coordinate::{
    register_pseudo, Coordinate, CoordinateField, CoordinateSettings, DuplicatePseudoError,
    ParseCoordinateError, ParseVersionError, ParseVersionErrorKind, Pseudo, PseudoComparator,
    StaticVersion, Version, DEFAULT_MAX_FIELD_LENGTH, LATEST, LATEST_RELEASE, MIN_FIELD_LENGTH,
    OLDEST,
};
pub use diver_repo::{ChainError, ChainWriteReport, RepositoryChain};
pub use diver_storage::{Backend, BackendError, HashState, ReadItem, StorageKey, StorageKeyError};
pub use diver_toc::{
    load_artifact_toc, save_artifact_toc, ArtifactToc, ChangeResult, NoOpTopTocService, TocError,
    TopToc, TopTocService, XmlTopTocService, TOC_XML_NAMESPACE, TOP_TOC_XML_NAMESPACE,
};

/// Convenience re-export of the types most callers need, for a single
/// `use diver::prelude::*;`.
pub mod prelude {
    pub use crate::{
        backend_with_toc_updates, Backend, ChainError, ChainWriteReport, Coordinate,
        HashState, LocalFsBackend, MemoryBackend, ReadItem, RepositoryBuilder,
        RepositoryChain, StorageKey, TocUpdatingBackend, Version,
    };
}
