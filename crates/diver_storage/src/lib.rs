//! Storage key layout and the backend contract every concrete store
//! implements (spec.md §4.B, §4.C, §3 "Storage key").

mod backend;
mod error;
mod hash;
mod key;

pub use backend::{Backend, HashState, ReadItem};
pub use error::BackendError;
pub use hash::sha256_hex;
pub use key::{StorageKey, StorageKeyError};
