use std::sync::atomic::{AtomicUsize, Ordering};

/// Default maximum length, in bytes, of a `groupId`, `artifactId`, or
/// `classifier` field.
pub const DEFAULT_MAX_FIELD_LENGTH: usize = 64;

/// Minimum length any field-length setting may be lowered to. A coordinate
/// field is always at least one character, so a limit below this would make
/// every coordinate unparsable.
pub const MIN_FIELD_LENGTH: usize = 1;

/// Process-wide, atomically-read configuration for [`crate::Coordinate`]
/// field length limits.
///
/// This mirrors the simplest faithful port of a global settings object: a
/// handful of `Atomic*` cells with relaxed ordering, not a full config
/// layer. Mutating these values after coordinates have already been parsed
/// is intentionally unsynchronized with respect to in-flight parses on
/// other threads; callers are expected to configure this at startup, before
/// spawning worker threads, the same way the conda/rattler global CUDA and
/// prefix-data caches are lazily-but-not-transactionally initialized.
#[derive(Debug)]
pub struct CoordinateSettings {
    group_id_max_length: AtomicUsize,
    artifact_id_max_length: AtomicUsize,
    classifier_max_length: AtomicUsize,
}

impl Default for CoordinateSettings {
    fn default() -> Self {
        Self {
            group_id_max_length: AtomicUsize::new(DEFAULT_MAX_FIELD_LENGTH),
            artifact_id_max_length: AtomicUsize::new(DEFAULT_MAX_FIELD_LENGTH),
            classifier_max_length: AtomicUsize::new(DEFAULT_MAX_FIELD_LENGTH),
        }
    }
}

impl CoordinateSettings {
    pub fn group_id_max_length(&self) -> usize {
        self.group_id_max_length.load(Ordering::Relaxed)
    }

    pub fn artifact_id_max_length(&self) -> usize {
        self.artifact_id_max_length.load(Ordering::Relaxed)
    }

    pub fn classifier_max_length(&self) -> usize {
        self.classifier_max_length.load(Ordering::Relaxed)
    }

    /// Sets the maximum length of a `groupId` field. Values below
    /// [`MIN_FIELD_LENGTH`] are clamped up to it.
    pub fn set_group_id_max_length(&self, len: usize) {
        let len = len.max(MIN_FIELD_LENGTH);
        tracing::warn!(len, "changing global groupId max length; any coordinate parse racing this call may observe either limit");
        self.group_id_max_length.store(len, Ordering::Relaxed);
    }

    pub fn set_artifact_id_max_length(&self, len: usize) {
        let len = len.max(MIN_FIELD_LENGTH);
        tracing::warn!(len, "changing global artifactId max length; any coordinate parse racing this call may observe either limit");
        self.artifact_id_max_length.store(len, Ordering::Relaxed);
    }

    pub fn set_classifier_max_length(&self, len: usize) {
        let len = len.max(MIN_FIELD_LENGTH);
        tracing::warn!(len, "changing global classifier max length; any coordinate parse racing this call may observe either limit");
        self.classifier_max_length.store(len, Ordering::Relaxed);
    }

    /// Restores every limit to [`DEFAULT_MAX_FIELD_LENGTH`]. Primarily useful
    /// for tests that exercise the length-limit invariant and must not leak
    /// a lowered limit into later, unrelated tests.
    pub fn reset_to_defaults(&self) {
        self.group_id_max_length
            .store(DEFAULT_MAX_FIELD_LENGTH, Ordering::Relaxed);
        self.artifact_id_max_length
            .store(DEFAULT_MAX_FIELD_LENGTH, Ordering::Relaxed);
        self.classifier_max_length
            .store(DEFAULT_MAX_FIELD_LENGTH, Ordering::Relaxed);
    }
}

static SETTINGS: CoordinateSettings = CoordinateSettings {
    group_id_max_length: AtomicUsize::new(DEFAULT_MAX_FIELD_LENGTH),
    artifact_id_max_length: AtomicUsize::new(DEFAULT_MAX_FIELD_LENGTH),
    classifier_max_length: AtomicUsize::new(DEFAULT_MAX_FIELD_LENGTH),
};

/// Returns the process-wide [`CoordinateSettings`].
pub fn settings() -> &'static CoordinateSettings {
    &SETTINGS
}
