use std::path::{Path, PathBuf};

use diver_storage::{Backend, BackendError, StorageKey};

/// A backend rooted at a directory on the local filesystem. Writes create
/// intermediate directories; deletes remove the file and best-effort-remove
/// its sidecar (spec.md §4.E "Local filesystem").
pub struct LocalFsBackend {
    id: String,
    root: PathBuf,
    writable: bool,
    deletable: bool,
    allow_overwrite: bool,
}

impl LocalFsBackend {
    pub fn new(id: impl Into<String>, root: impl Into<PathBuf>, writable: bool, deletable: bool, allow_overwrite: bool) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
            writable,
            deletable,
            allow_overwrite,
        }
    }

    fn path_for(&self, key: &StorageKey) -> PathBuf {
        key.path().split('/').fold(self.root.clone(), |mut acc, segment| {
            acc.push(segment);
            acc
        })
    }
}

impl Backend for LocalFsBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn backend_type(&self) -> &'static str {
        "local-fs"
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
        Ok(self.path_for(key).is_file())
    }

    fn read_raw(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, BackendError> {
        let path = self.path_for(key);
        match fs_err::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(BackendError::io(&self.id, err)),
        }
    }

    fn write_raw(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent).map_err(|err| BackendError::io(&self.id, err))?;
        }
        fs_err::write(&path, content).map_err(|err| BackendError::io(&self.id, err))
    }

    fn delete_raw(&self, key: &StorageKey) -> Result<(), BackendError> {
        let path = self.path_for(key);
        match fs_err::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(BackendError::io(&self.id, err)),
        }
    }
}

/// Resolves a [`StorageKey`] to its on-disk path under `root`, for callers
/// that need to inspect the filesystem directly (e.g. tests).
pub fn resolve_path(root: &Path, key: &StorageKey) -> PathBuf {
    key.path().split('/').fold(root.to_path_buf(), |mut acc, segment| {
        acc.push(segment);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_creates_intermediate_directories() {
        let dir = tempdir().unwrap();
        let backend = LocalFsBackend::new("fs", dir.path(), true, true, false);
        let key = StorageKey::from_raw_path("com/ecosio/test-artefact/1.2/test-artefact-1.2.xml").unwrap();
        backend.write(&key, b"<xml/>").unwrap();
        assert!(resolve_path(dir.path(), &key).is_file());
        let item = backend.read(&key).unwrap().unwrap();
        assert_eq!(item.bytes, b"<xml/>");
    }

    #[test]
    fn delete_is_a_no_op_for_missing_file() {
        let dir = tempdir().unwrap();
        let backend = LocalFsBackend::new("fs", dir.path(), true, true, false);
        let key = StorageKey::from_raw_path("missing").unwrap();
        backend.delete(&key).unwrap();
    }

    #[test]
    fn read_of_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let backend = LocalFsBackend::new("fs", dir.path(), true, true, false);
        let key = StorageKey::from_raw_path("missing").unwrap();
        assert_eq!(backend.read(&key).unwrap().map(|i| i.bytes), None);
    }
}
