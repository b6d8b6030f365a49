use thiserror::Error;

/// Error taxonomy for backend operations (spec.md §7 `BackendIOError` and
/// `Unsupported`). `NotFound` is deliberately not a variant here: per
/// spec.md, it is a normal outcome of `read`/`exists`, represented as
/// `Ok(None)` / `Ok(false)`, not an error.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("I/O error in backend '{backend}': {source}")]
    Io {
        backend: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport error in backend '{backend}': {message}")]
    Transport { backend: String, message: String },

    #[error("'{op}' is not supported by backend '{backend}' ({backend_type})")]
    Unsupported {
        backend: String,
        backend_type: &'static str,
        op: &'static str,
    },

    /// A write targeted an existing key on a backend that does not allow
    /// overwrites (spec.md §5 "No artifact mutation").
    #[error("'{key}' already exists on backend '{backend}' and overwrites are not allowed")]
    AlreadyExists { backend: String, key: String },
}

impl BackendError {
    pub fn io(backend: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            backend: backend.into(),
            source,
        }
    }

    pub fn transport(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(backend: impl Into<String>, backend_type: &'static str, op: &'static str) -> Self {
        Self::Unsupported {
            backend: backend.into(),
            backend_type,
            op,
        }
    }

    pub fn already_exists(backend: impl Into<String>, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            backend: backend.into(),
            key: key.into(),
        }
    }
}
