use diver_storage::{Backend, BackendError, StorageKey};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

/// A backend that maps keys to `<baseUrl>/<path>` and speaks plain HTTP
/// verbs: GET for read, HEAD for exists, PUT for write, DELETE for delete
/// (spec.md §4.E "HTTP"). It never retries; retry policy is the caller's.
pub struct HttpBackend {
    id: String,
    base_url: Url,
    client: Client,
    writable: bool,
    deletable: bool,
    allow_overwrite: bool,
}

impl HttpBackend {
    /// `base_url` must end with `/` so that [`Url::join`] appends rather
    /// than replaces its last path segment.
    pub fn new(
        id: impl Into<String>,
        base_url: Url,
        client: Client,
        writable: bool,
        deletable: bool,
        allow_overwrite: bool,
    ) -> Self {
        Self {
            id: id.into(),
            base_url,
            client,
            writable,
            deletable,
            allow_overwrite,
        }
    }

    fn url_for(&self, key: &StorageKey) -> Result<Url, BackendError> {
        self.base_url
            .join(key.path())
            .map_err(|err| BackendError::transport(&self.id, format!("invalid key '{key}': {err}")))
    }
}

impl Backend for HttpBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn backend_type(&self) -> &'static str {
        "http"
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
        let url = self.url_for(key)?;
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|err| BackendError::transport(&self.id, err.to_string()))?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(BackendError::transport(&self.id, format!("HEAD returned {status}"))),
        }
    }

    fn read_raw(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, BackendError> {
        let url = self.url_for(key)?;
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| BackendError::transport(&self.id, err.to_string()))?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .bytes()
                .map(|bytes| Some(bytes.to_vec()))
                .map_err(|err| BackendError::transport(&self.id, err.to_string())),
            status => Err(BackendError::transport(&self.id, format!("GET returned {status}"))),
        }
    }

    fn write_raw(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError> {
        let url = self.url_for(key)?;
        let response = self
            .client
            .put(url)
            .body(content.to_vec())
            .send()
            .map_err(|err| BackendError::transport(&self.id, err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::transport(&self.id, format!("PUT returned {}", response.status())))
        }
    }

    fn delete_raw(&self, key: &StorageKey) -> Result<(), BackendError> {
        let url = self.url_for(key)?;
        let response = self
            .client
            .delete(url)
            .send()
            .map_err(|err| BackendError::transport(&self.id, err.to_string()))?;
        match response.status() {
            status if status.is_success() || status == StatusCode::NOT_FOUND => Ok(()),
            status => Err(BackendError::transport(&self.id, format!("DELETE returned {status}"))),
        }
    }
}
