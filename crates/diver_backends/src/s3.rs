use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use diver_storage::{Backend, BackendError, StorageKey};
use url::Url;

/// How to reach the bucket: through AWS's own configuration discovery, or
/// with an explicit endpoint/region/credentials (e.g. for an S3-compatible
/// store) (spec.md §4.E "Object store").
#[derive(Debug, Clone)]
pub enum S3Config {
    FromAws,
    Custom {
        endpoint_url: Url,
        region: String,
        force_path_style: bool,
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
}

/// A backend addressing objects in an S3-compatible bucket under
/// `default_key_prefix`. The prefix must be empty or non-slash-prefixed and
/// slash-suffixed (spec.md §4.E), validated at construction.
///
/// The core library is synchronous (spec.md §5), but the AWS SDK is
/// async-only; this backend owns a dedicated single-threaded Tokio runtime
/// and blocks on it for every call, so it still satisfies the blocking
/// [`Backend`] contract.
pub struct ObjectStoreBackend {
    id: String,
    bucket: String,
    default_key_prefix: String,
    client: Client,
    runtime: tokio::runtime::Runtime,
    writable: bool,
    deletable: bool,
    allow_overwrite: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectStoreConfigError {
    #[error("default key prefix must not start with '/': '{0}'")]
    LeadingSlash(String),
    #[error("non-empty default key prefix must end with '/': '{0}'")]
    MissingTrailingSlash(String),
    #[error("failed to start the object-store runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl ObjectStoreBackend {
    pub fn new(
        id: impl Into<String>,
        bucket: impl Into<String>,
        default_key_prefix: impl Into<String>,
        config: S3Config,
        writable: bool,
        deletable: bool,
        allow_overwrite: bool,
    ) -> Result<Self, ObjectStoreConfigError> {
        let default_key_prefix = default_key_prefix.into();
        if default_key_prefix.starts_with('/') {
            return Err(ObjectStoreConfigError::LeadingSlash(default_key_prefix));
        }
        if !default_key_prefix.is_empty() && !default_key_prefix.ends_with('/') {
            return Err(ObjectStoreConfigError::MissingTrailingSlash(default_key_prefix));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ObjectStoreConfigError::Runtime)?;
        let client = runtime.block_on(build_client(&config));

        Ok(Self {
            id: id.into(),
            bucket: bucket.into(),
            default_key_prefix,
            client,
            runtime,
            writable,
            deletable,
            allow_overwrite,
        })
    }

    fn object_key(&self, key: &StorageKey) -> String {
        format!("{}{}", self.default_key_prefix, key.path())
    }
}

async fn build_client(config: &S3Config) -> Client {
    match config {
        S3Config::FromAws => {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            Client::new(&sdk_config)
        }
        S3Config::Custom {
            endpoint_url,
            region,
            force_path_style,
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                .no_credentials()
                .load()
                .await;
            let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint_url.as_str())
                .region(Region::new(region.clone()))
                .force_path_style(*force_path_style)
                .credentials_provider(Credentials::new(
                    access_key_id.clone(),
                    secret_access_key.clone(),
                    session_token.clone(),
                    None,
                    "diver",
                ))
                .build();
            Client::from_conf(s3_config)
        }
    }
}

impl Backend for ObjectStoreBackend {
    fn id(&self) -> &str {
        &self.id
    }

    fn backend_type(&self) -> &'static str {
        "s3"
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
        let object_key = self.object_key(key);
        self.runtime.block_on(async {
            match self.client.head_object().bucket(&self.bucket).key(&object_key).send().await {
                Ok(_) => Ok(true),
                Err(err) => {
                    let service_err = err.into_service_error();
                    if service_err.is_not_found() {
                        Ok(false)
                    } else {
                        Err(BackendError::transport(&self.id, service_err.to_string()))
                    }
                }
            }
        })
    }

    fn read_raw(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, BackendError> {
        let object_key = self.object_key(key);
        self.runtime.block_on(async {
            let output = match self.client.get_object().bucket(&self.bucket).key(&object_key).send().await {
                Ok(output) => output,
                Err(err) => {
                    let service_err = err.into_service_error();
                    if service_err.is_no_such_key() {
                        return Ok(None);
                    }
                    return Err(BackendError::transport(&self.id, service_err.to_string()));
                }
            };
            let bytes = output
                .body
                .collect()
                .await
                .map_err(|err| BackendError::transport(&self.id, err.to_string()))?
                .into_bytes();
            Ok(Some(bytes.to_vec()))
        })
    }

    fn write_raw(&self, key: &StorageKey, content: &[u8]) -> Result<(), BackendError> {
        let object_key = self.object_key(key);
        self.runtime.block_on(async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(&object_key)
                .body(ByteStream::from(content.to_vec()))
                .send()
                .await
                .map_err(|err| BackendError::transport(&self.id, err.into_service_error().to_string()))?;
            Ok(())
        })
    }

    fn delete_raw(&self, key: &StorageKey) -> Result<(), BackendError> {
        let object_key = self.object_key(key);
        self.runtime.block_on(async {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(&object_key)
                .send()
                .await
                .map_err(|err| BackendError::transport(&self.id, err.into_service_error().to_string()))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_must_not_start_with_slash() {
        assert!(matches!(
            ObjectStoreBackend::new("s3", "bucket", "/bad", S3Config::FromAws, true, true, false),
            Err(ObjectStoreConfigError::LeadingSlash(_))
        ));
    }

    #[test]
    fn non_empty_prefix_must_end_with_slash() {
        assert!(matches!(
            ObjectStoreBackend::new("s3", "bucket", "bad", S3Config::FromAws, true, true, false),
            Err(ObjectStoreConfigError::MissingTrailingSlash(_))
        ));
    }
}
