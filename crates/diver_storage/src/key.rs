use std::fmt;

use diver_coordinate::Coordinate;
use thiserror::Error;

/// Error returned when constructing a [`StorageKey`] from a raw path.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum StorageKeyError {
    #[error("storage key path must not start with '/': '{0}'")]
    LeadingSlash(String),

    #[error("storage key path must not be empty")]
    Empty,
}

const SHA256_SUFFIX: &str = ".sha256";
const TOC_FILE_NAME: &str = "toc-diver.xml";
const TOP_TOC_FILE_NAME: &str = "toptoc-diver.xml";

/// A `/`-delimited path into a repository backend, e.g.
/// `com/ecosio/test-artefact/1.2/test-artefact-1.2.xml`.
///
/// See spec.md §3 "Storage key" and §6 "Canonical path layout".
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StorageKey {
    path: String,
}

impl StorageKey {
    /// Builds a key from an already-formed path, validating spec.md §7's
    /// "path starting with `/`" rule.
    pub fn from_raw_path(path: impl Into<String>) -> Result<Self, StorageKeyError> {
        let path = path.into();
        if path.is_empty() {
            return Err(StorageKeyError::Empty);
        }
        if path.starts_with('/') {
            return Err(StorageKeyError::LeadingSlash(path));
        }
        Ok(Self { path })
    }

    /// The data-object key for a coordinate's payload:
    /// `<group>/<artifact>/<version>/<artifact>-<version><ext>`.
    pub fn for_artifact(coordinate: &Coordinate, ext: &str) -> Self {
        let group_path = coordinate.group_segments().join("/");
        let version = coordinate.version().canonical();
        let path = format!(
            "{group_path}/{artifact}/{version}/{artifact}-{version}{ext}",
            group_path = group_path,
            artifact = coordinate.artifact_id(),
            version = version,
            ext = ext,
        );
        Self { path }
    }

    /// The per-artifact table-of-contents key: `<group>/<artifact>/toc-diver.xml`.
    pub fn toc(group_id: &str, artifact_id: &str) -> Self {
        let group_path = group_id.replace('.', "/");
        Self {
            path: format!("{group_path}/{artifact_id}/{TOC_FILE_NAME}"),
        }
    }

    /// The repository-wide top-ToC key: `toptoc-diver.xml`.
    pub fn top_toc() -> Self {
        Self {
            path: TOP_TOC_FILE_NAME.to_string(),
        }
    }

    /// The implicit hash sidecar key for this key: `<path>.sha256`.
    pub fn sidecar(&self) -> Self {
        Self {
            path: format!("{}{SHA256_SUFFIX}", self.path),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `true` if this key addresses a per-artifact ToC document.
    pub fn is_artifact_toc(&self) -> bool {
        self.path.ends_with(TOC_FILE_NAME)
    }

    /// `true` if this key addresses the repository-wide top-ToC document.
    pub fn is_top_toc(&self) -> bool {
        self.path == TOP_TOC_FILE_NAME
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diver_coordinate::Coordinate;
    use rstest::rstest;

    #[rstest]
    #[case("com.ecosio:test-artefact:1.2.0", ".xml", "com/ecosio/test-artefact/1.2/test-artefact-1.2.xml")]
    #[case("a:b:4", ".xyz", "a/b/4/b-4.xyz")]
    fn artifact_path_layout(#[case] coordinate: &str, #[case] extension: &str, #[case] expected: &str) {
        let c = Coordinate::parse(coordinate).unwrap();
        let key = StorageKey::for_artifact(&c, extension);
        assert_eq!(key.path(), expected);
    }

    #[test]
    fn sidecar_appends_suffix() {
        let c = Coordinate::parse("a:b:4").unwrap();
        let key = StorageKey::for_artifact(&c, ".xyz");
        assert_eq!(key.sidecar().path(), "a/b/4/b-4.xyz.sha256");
    }

    #[test]
    fn toc_key_layout() {
        let key = StorageKey::toc("com.ecosio", "test-artefact");
        assert_eq!(key.path(), "com/ecosio/test-artefact/toc-diver.xml");
        assert!(key.is_artifact_toc());
    }

    #[test]
    fn top_toc_key_layout() {
        let key = StorageKey::top_toc();
        assert_eq!(key.path(), "toptoc-diver.xml");
        assert!(key.is_top_toc());
    }

    #[test]
    fn leading_slash_rejected() {
        assert!(matches!(
            StorageKey::from_raw_path("/abs/path"),
            Err(StorageKeyError::LeadingSlash(_))
        ));
    }
}
