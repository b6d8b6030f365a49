use crate::error::BackendError;
use crate::hash::{normalize_sidecar, sha256_hex};
use crate::key::StorageKey;

/// The result of comparing a read payload against its `.sha256` sidecar
/// (spec.md §4.B "Hash discipline").
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum HashState {
    /// No sidecar was present.
    NotVerified,
    /// A sidecar was present and matched the payload's SHA-256.
    VerifiedMatching,
    /// A sidecar was present but did not match; the payload is still
    /// returned to the caller, who decides whether to trust it.
    VerifiedNonMatching,
}

impl HashState {
    /// `true` for [`HashState::VerifiedNonMatching`] — per spec.md §4.H, a
    /// chain SHOULD treat this as a miss for write-back purposes.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, HashState::VerifiedNonMatching)
    }
}

/// The bytes of a read object plus their verification state.
#[derive(Debug, Clone)]
pub struct ReadItem {
    pub bytes: Vec<u8>,
    pub hash_state: HashState,
}

/// The uniform storage abstraction every concrete backend implements
/// (spec.md §4.B).
///
/// Implementors provide the four `*_raw` methods, which talk to the
/// backend's underlying store with no knowledge of the hash-sidecar
/// discipline or capability checks; [`Backend::read`], [`Backend::write`],
/// and [`Backend::delete`] are default methods that layer that discipline
/// on top uniformly, so every backend gets it for free (the differences
/// between backends are mechanical path/protocol mapping, per spec.md
/// §4.E, not hashing policy).
pub trait Backend: Send + Sync {
    /// A stable id used in logs and diagnostics (spec.md §4.B).
    fn id(&self) -> &str;

    /// A short type tag, e.g. `"memory"`, `"local-fs"`, `"http"`, `"s3"`.
    fn backend_type(&self) -> &'static str;

    fn is_writable(&self) -> bool;

    fn is_deletable(&self) -> bool;

    /// Whether `write` may replace an existing key's payload. Defaults to
    /// `false`: per spec.md §5, writing to a path that already exists is
    /// rejected unless a backend opts into `AllowOverwrite`.
    fn allow_overwrite(&self) -> bool {
        false
    }

    /// `true` if `key` exists, independent of the hash sidecar.
    fn exists_raw(&self, key: &StorageKey) -> Result<bool, BackendError>;

    /// Reads the raw bytes at `key`, with no hash-sidecar handling.
    /// `Ok(None)` means not found (spec.md §7 `NotFound`).
    fn read_raw(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, BackendError>;

    /// Writes raw bytes at `key`. Only called after a capability check.
    fn write_raw(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError>;

    /// Deletes `key`. Missing keys are not an error. Only called after a
    /// capability check.
    fn delete_raw(&self, key: &StorageKey) -> Result<(), BackendError>;

    /// `true` if `key` exists.
    fn exists(&self, key: &StorageKey) -> Result<bool, BackendError> {
        self.exists_raw(key)
    }

    /// Reads `key`, verifying its `.sha256` sidecar if present.
    fn read(&self, key: &StorageKey) -> Result<Option<ReadItem>, BackendError> {
        let Some(bytes) = self.read_raw(key)? else {
            return Ok(None);
        };
        let sidecar = self.read_raw(&key.sidecar())?;
        let hash_state = match sidecar {
            None => HashState::NotVerified,
            Some(raw) => {
                let expected = normalize_sidecar(&raw);
                let actual = sha256_hex(&bytes);
                if expected == actual {
                    HashState::VerifiedMatching
                } else {
                    tracing::warn!(
                        backend = self.id(),
                        key = %key,
                        "sha256 sidecar mismatch"
                    );
                    HashState::VerifiedNonMatching
                }
            }
        };
        Ok(Some(ReadItem { bytes, hash_state }))
    }

    /// Writes `content` at `key`, then writes its `.sha256` sidecar. If the
    /// sidecar write fails, best-effort deletes the payload so the store
    /// does not end up with an object and no sidecar (spec.md §4.B).
    fn write(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError> {
        if !self.is_writable() {
            return Err(BackendError::unsupported(self.id(), self.backend_type(), "write"));
        }
        // ToC documents are rewritten on every mutation by design (spec.md
        // §4.F/§4.G); only artifact payload keys are subject to the
        // overwrite policy below.
        if !self.allow_overwrite()
            && !key.is_artifact_toc()
            && !key.is_top_toc()
            && self.exists_raw(key)?
        {
            return Err(BackendError::already_exists(self.id(), key.path()));
        }
        self.write_raw(key, content)?;
        let hash = sha256_hex(content);
        if let Err(err) = self.write_raw(&key.sidecar(), hash.as_bytes()) {
            tracing::warn!(
                backend = self.id(),
                key = %key,
                %err,
                "sidecar write failed after payload write; deleting payload to stay consistent"
            );
            let _ = self.delete_raw(key);
            return Err(err);
        }
        Ok(())
    }

    /// Deletes both the payload and its sidecar at `key`. A missing
    /// sidecar is not an error.
    fn delete(&self, key: &StorageKey) -> Result<(), BackendError> {
        if !self.is_deletable() {
            return Err(BackendError::unsupported(self.id(), self.backend_type(), "delete"));
        }
        self.delete_raw(key)?;
        self.delete_raw(&key.sidecar())?;
        Ok(())
    }
}
