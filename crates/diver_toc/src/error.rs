use thiserror::Error;

use diver_storage::BackendError;

/// Errors that can occur while maintaining a per-artifact ToC or the
/// repository-wide top-ToC (spec.md §4.F, §4.G).
#[derive(Debug, Error)]
pub enum TocError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("malformed ToC document at '{key}': {message}")]
    Malformed { key: String, message: String },

    #[error("invalid version '{version}' in ToC document at '{key}'")]
    InvalidVersion { key: String, version: String },
}
