//! Concrete [`diver_storage::Backend`] implementations (in-memory, local
//! filesystem, HTTP, object store) and the ToC-maintaining wrapper that
//! composes any of them with [`diver_toc`] (spec.md §4.E, §4.F).

mod http;
mod local_fs;
mod memory;
mod s3;
mod toc_backend;

pub use http::HttpBackend;
pub use local_fs::{resolve_path, LocalFsBackend};
pub use memory::MemoryBackend;
pub use s3::{ObjectStoreBackend, ObjectStoreConfigError, S3Config};
pub use toc_backend::TocUpdatingBackend;
