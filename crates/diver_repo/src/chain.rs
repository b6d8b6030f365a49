use std::sync::Arc;

use diver_storage::{Backend, BackendError, ReadItem, StorageKey};

use crate::error::ChainError;

/// Per-backend outcome of a `write`/`delete` fanned out across every
/// writable tier (supplements spec.md §4.H, which only says such a call
/// "reports overall failure if any fails" without naming a return shape).
#[derive(Debug, Clone, Default)]
pub struct ChainWriteReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl ChainWriteReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// An ordered composition of backends with read fallback and write-back to
/// earlier writable tiers (spec.md §4.H, §3 "Chain").
pub struct RepositoryChain {
    storages: Vec<Arc<dyn Backend>>,
    writable_indices: Vec<usize>,
    cache_remote_content: bool,
}

impl RepositoryChain {
    /// `writable_indices` names the subset of `storages` (by index into
    /// that list) that participate in write-back, in read-order preference.
    pub fn new(storages: Vec<Arc<dyn Backend>>, writable_indices: Vec<usize>, cache_remote_content: bool) -> Self {
        Self {
            storages,
            writable_indices,
            cache_remote_content,
        }
    }

    /// Builds a chain whose writable tier is exactly the backends that
    /// report `is_writable() == true`, in their `storages` order.
    pub fn from_storages(storages: Vec<Arc<dyn Backend>>, cache_remote_content: bool) -> Self {
        let writable_indices = storages
            .iter()
            .enumerate()
            .filter(|(_, backend)| backend.is_writable())
            .map(|(i, _)| i)
            .collect();
        Self::new(storages, writable_indices, cache_remote_content)
    }

    pub fn cache_remote_content(&self) -> bool {
        self.cache_remote_content
    }

    /// Reads `key` from the first backend with a hit, in `storages` order.
    /// On a hit from a non-writable-tier backend, with `cacheRemoteContent`
    /// enabled, back-fills every writable tier that precedes the hit
    /// (spec.md §4.H). A `VerifiedNonMatching` hit is never written back, so
    /// corruption is not propagated into earlier tiers.
    #[tracing::instrument(skip(self), fields(key = %key))]
    pub fn read(&self, key: &StorageKey) -> Result<Option<ReadItem>, BackendError> {
        for (index, backend) in self.storages.iter().enumerate() {
            let Some(item) = backend.read(key)? else {
                continue;
            };

            if self.cache_remote_content && !item.hash_state.is_corrupt() && !self.writable_indices.contains(&index) {
                for &writable_index in self.writable_indices.iter().filter(|&&w| w < index) {
                    let writable = &self.storages[writable_index];
                    match writable.write(key, &item.bytes) {
                        Ok(()) => tracing::debug!(backend = writable.id(), key = %key, "wrote-back read-through hit into cache tier"),
                        Err(err) => tracing::warn!(
                            backend = writable.id(),
                            key = %key,
                            %err,
                            "write-back to cache tier failed; read result is unaffected"
                        ),
                    }
                }
            }

            return Ok(Some(item));
        }
        Ok(None)
    }

    /// Writes `content` at `key` to every writable backend, in order.
    #[tracing::instrument(skip(self, content), fields(key = %key, len = content.len()))]
    pub fn write(&self, key: &StorageKey, content: &[u8]) -> Result<ChainWriteReport, ChainError> {
        self.fan_out(|backend| backend.write(key, content))
    }

    /// Deletes `key` from every writable (and deletable) backend, in order.
    #[tracing::instrument(skip(self), fields(key = %key))]
    pub fn delete(&self, key: &StorageKey) -> Result<ChainWriteReport, ChainError> {
        self.fan_out(|backend| backend.delete(key))
    }

    fn fan_out(&self, op: impl Fn(&Arc<dyn Backend>) -> Result<(), BackendError>) -> Result<ChainWriteReport, ChainError> {
        if self.writable_indices.is_empty() {
            return Err(ChainError::NoWritableBackend);
        }
        let mut report = ChainWriteReport::default();
        for &index in &self.writable_indices {
            let backend = &self.storages[index];
            match op(backend) {
                Ok(()) => report.succeeded.push(backend.id().to_string()),
                Err(err) => report.failed.push((backend.id().to_string(), err.to_string())),
            }
        }
        if report.all_succeeded() {
            Ok(report)
        } else {
            Err(ChainError::PartialFailure(report))
        }
    }
}
