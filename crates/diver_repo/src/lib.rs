//! The prioritised repository chain: read cascade plus optional write-back
//! caching over a set of [`diver_storage::Backend`]s (spec.md §4.H).

mod chain;
mod error;

pub use chain::{ChainWriteReport, RepositoryChain};
pub use error::ChainError;
