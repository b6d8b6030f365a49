use chrono::{DateTime, SecondsFormat, Utc};
use diver_coordinate::Version;
use diver_storage::{Backend, StorageKey};
use serde::{Deserialize, Serialize};

use crate::error::TocError;

/// XML namespace for the per-artifact ToC document (spec.md §6).
pub const TOC_XML_NAMESPACE: &str = "urn:com:helger:diver:repotoc:v1.0";

/// Whether a mutating [`ArtifactToc`] operation actually changed state.
/// `Add` is idempotent for an identical `(version, publishedAt)` pair.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ChangeResult {
    Changed,
    Unchanged,
}

impl ChangeResult {
    pub fn is_changed(&self) -> bool {
        matches!(self, ChangeResult::Changed)
    }
}

/// The set of published versions for one `(groupId, artifactId)`, each
/// stamped with the wall-clock time it was published (spec.md §4.F).
#[derive(Debug, Clone)]
pub struct ArtifactToc {
    group_id: String,
    artifact_id: String,
    entries: Vec<(Version, DateTime<Utc>)>,
}

impl ArtifactToc {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Records `version` as published at `published_at`. Idempotent for an
    /// identical `(version, publishedAt)` pair; re-adding an existing
    /// version with a different timestamp overwrites it and reports
    /// [`ChangeResult::Changed`].
    pub fn add(&mut self, version: Version, published_at: DateTime<Utc>) -> ChangeResult {
        if let Some(existing) = self.entries.iter_mut().find(|(v, _)| *v == version) {
            if existing.1 == published_at {
                return ChangeResult::Unchanged;
            }
            existing.1 = published_at;
            return ChangeResult::Changed;
        }
        self.entries.push((version, published_at));
        ChangeResult::Changed
    }

    pub fn remove(&mut self, version: &Version) -> ChangeResult {
        let before = self.entries.len();
        self.entries.retain(|(v, _)| v != version);
        if self.entries.len() == before {
            ChangeResult::Unchanged
        } else {
            ChangeResult::Changed
        }
    }

    pub fn contains(&self, version: &Version) -> bool {
        self.entries.iter().any(|(v, _)| v == version)
    }

    /// All recorded versions, ascending.
    pub fn all(&self) -> Vec<(Version, DateTime<Utc>)> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// The highest version by total order, regardless of snapshot status.
    pub fn latest(&self) -> Option<&Version> {
        self.entries.iter().map(|(v, _)| v).max_by(|a, b| a.cmp(b))
    }

    /// The highest non-snapshot static version.
    pub fn latest_release(&self) -> Option<&Version> {
        self.entries
            .iter()
            .map(|(v, _)| v)
            .filter(|v| matches!(v, Version::Static(s) if !s.is_snapshot()))
            .max_by(|a, b| a.cmp(b))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "repotoc")]
struct TocDocument {
    xmlns: String,
    #[serde(rename = "groupId")]
    group_id: String,
    #[serde(rename = "artifactId")]
    artifact_id: String,
    versioning: VersioningElement,
}

#[derive(Debug, Serialize, Deserialize)]
struct VersioningElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    latest: Option<String>,
    #[serde(rename = "latestRelease", skip_serializing_if = "Option::is_none")]
    latest_release: Option<String>,
    versions: VersionsElement,
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionsElement {
    #[serde(rename = "version", default)]
    version: Vec<VersionEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionEntry {
    published: String,
    #[serde(rename = "$value")]
    value: String,
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(key: &str, raw: &str) -> Result<DateTime<Utc>, TocError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| TocError::Malformed {
            key: key.to_string(),
            message: format!("invalid timestamp '{raw}': {err}"),
        })
}

impl ArtifactToc {
    /// Serializes this ToC to its XML wire format.
    pub fn to_xml(&self) -> Result<String, TocError> {
        let all = self.all();
        let doc = TocDocument {
            xmlns: TOC_XML_NAMESPACE.to_string(),
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            versioning: VersioningElement {
                latest: self.latest().map(Version::canonical),
                latest_release: self.latest_release().map(Version::canonical),
                versions: VersionsElement {
                    version: all
                        .iter()
                        .map(|(v, ts)| VersionEntry {
                            published: format_timestamp(ts),
                            value: v.canonical(),
                        })
                        .collect(),
                },
            },
        };
        serde_xml_rs::to_string(&doc).map_err(|err| TocError::Malformed {
            key: format!("{}/{}", self.group_id, self.artifact_id),
            message: err.to_string(),
        })
    }

    /// Parses an [`ArtifactToc`] from its XML wire format. `group_id` and
    /// `artifact_id` are taken from the caller's context (the storage key),
    /// not re-derived from the document, so a malformed or stale document
    /// body cannot misfile entries under the wrong artifact.
    pub fn from_xml(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        xml: &str,
    ) -> Result<Self, TocError> {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();
        let key = format!("{group_id}/{artifact_id}");
        let doc: TocDocument = serde_xml_rs::from_str(xml).map_err(|err| TocError::Malformed {
            key: key.clone(),
            message: err.to_string(),
        })?;
        let mut toc = ArtifactToc::new(group_id, artifact_id);
        for entry in doc.versioning.versions.version {
            let version = Version::parse(&entry.value).map_err(|_| TocError::InvalidVersion {
                key: key.clone(),
                version: entry.value.clone(),
            })?;
            let published_at = parse_timestamp(&key, &entry.published)?;
            toc.add(version, published_at);
        }
        Ok(toc)
    }
}

/// Loads the per-artifact ToC for `(group_id, artifact_id)` from `backend`,
/// returning an empty [`ArtifactToc`] if none has been written yet.
pub fn load_artifact_toc(
    backend: &dyn Backend,
    group_id: &str,
    artifact_id: &str,
) -> Result<ArtifactToc, TocError> {
    let key = StorageKey::toc(group_id, artifact_id);
    match backend.read(&key)? {
        Some(item) => {
            let xml = String::from_utf8_lossy(&item.bytes);
            ArtifactToc::from_xml(group_id, artifact_id, &xml)
        }
        None => Ok(ArtifactToc::new(group_id, artifact_id)),
    }
}

/// Persists `toc` to `backend` at its canonical key.
pub fn save_artifact_toc(backend: &dyn Backend, toc: &ArtifactToc) -> Result<(), TocError> {
    let key = StorageKey::toc(toc.group_id(), toc.artifact_id());
    let xml = toc.to_xml()?;
    backend.write(&key, xml.as_bytes())?;
    Ok(())
}
