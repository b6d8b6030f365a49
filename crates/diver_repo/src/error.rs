use thiserror::Error;

use crate::chain::ChainWriteReport;

/// Errors from [`crate::RepositoryChain`] operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// A read-through write-back attempt is logged, not surfaced, so this
    /// variant is only returned by `write`/`delete`: at least one writable
    /// tier failed the mutation (spec.md §4.H "reports overall failure if
    /// any fails").
    #[error("{} of {} writable backends failed", .0.failed.len(), .0.failed.len() + .0.succeeded.len())]
    PartialFailure(ChainWriteReport),

    /// No writable backend is configured for a `write`/`delete` call.
    #[error("no writable backend is configured in this chain")]
    NoWritableBackend,
}
