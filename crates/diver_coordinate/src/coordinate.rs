use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::settings;
use crate::version::{ParseVersionError, Version};

/// Maximum length of a valid field is bounded by
/// [`settings::CoordinateSettings`]; characters are restricted to this
/// ASCII subset regardless of length.
fn is_valid_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'
}

fn validate_field(
    value: &str,
    field: CoordinateField,
    max_len: usize,
) -> Result<(), ParseCoordinateError> {
    if value.is_empty() {
        return Err(ParseCoordinateError::EmptyField(field));
    }
    if value.len() > max_len {
        return Err(ParseCoordinateError::FieldTooLong {
            field,
            max_len,
            actual_len: value.len(),
        });
    }
    if let Some(bad) = value.chars().find(|c| !is_valid_field_char(*c)) {
        return Err(ParseCoordinateError::IllegalCharacter { field, char: bad });
    }
    Ok(())
}

/// Which coordinate field a [`ParseCoordinateError`] refers to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CoordinateField {
    GroupId,
    ArtifactId,
    Version,
    Classifier,
}

impl fmt::Display for CoordinateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoordinateField::GroupId => "groupId",
            CoordinateField::ArtifactId => "artifactId",
            CoordinateField::Version => "version",
            CoordinateField::Classifier => "classifier",
        };
        f.write_str(s)
    }
}

/// Error returned by [`Coordinate::parse`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseCoordinateError {
    #[error("coordinate must have 3 or 4 ':'-separated fields, found {0}")]
    WrongFieldCount(usize),

    #[error("{0} must not be empty")]
    EmptyField(CoordinateField),

    #[error("{field} exceeds the maximum length of {max_len} (was {actual_len})")]
    FieldTooLong {
        field: CoordinateField,
        max_len: usize,
        actual_len: usize,
    },

    #[error("{field} contains an illegal character '{char}'")]
    IllegalCharacter { field: CoordinateField, char: char },

    #[error("invalid version: {0}")]
    Version(#[from] ParseVersionError),
}

/// A Maven-style artifact coordinate: `(groupId, artifactId, version,
/// classifier?)`. See spec.md §3.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Coordinate {
    group_id: String,
    artifact_id: String,
    version: Version,
    classifier: Option<String>,
}

impl Coordinate {
    /// Constructs a coordinate directly from already-validated parts.
    /// Prefer [`Coordinate::parse`] when the parts come from untrusted
    /// input.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: Version,
        classifier: Option<String>,
    ) -> Result<Self, ParseCoordinateError> {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();
        let s = settings::settings();
        validate_field(&group_id, CoordinateField::GroupId, s.group_id_max_length())?;
        validate_field(
            &artifact_id,
            CoordinateField::ArtifactId,
            s.artifact_id_max_length(),
        )?;
        if let Some(c) = &classifier {
            validate_field(c, CoordinateField::Classifier, s.classifier_max_length())?;
        }
        Ok(Self {
            group_id,
            artifact_id,
            version,
            classifier,
        })
    }

    /// Parses `group:artifact:version[:classifier]`. A lone trailing `:`
    /// after the version (with no classifier text following) is accepted
    /// and treated as "no classifier" (spec.md §4.A).
    pub fn parse(s: &str) -> Result<Self, ParseCoordinateError> {
        let parts: Vec<&str> = s.split(':').collect();
        let (group_id, artifact_id, version_str, classifier) = match parts.as_slice() {
            [g, a, v] => (*g, *a, *v, None),
            [g, a, v, c] if !c.is_empty() => (*g, *a, *v, Some((*c).to_string())),
            [g, a, v, c] if c.is_empty() => (*g, *a, *v, None),
            other => return Err(ParseCoordinateError::WrongFieldCount(other.len())),
        };

        if version_str.is_empty() {
            return Err(ParseCoordinateError::EmptyField(CoordinateField::Version));
        }
        let version = Version::parse(version_str)?;
        Coordinate::new(group_id, artifact_id, version, classifier)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Returns the `group` path segments with dots replacing `.`-joined
    /// components split into individual directory names, e.g. `com.helger`
    /// becomes `["com", "helger"]`. Used by `diver_storage` to build the
    /// on-disk/on-wire key layout (spec.md §3 "Storage key").
    pub fn group_segments(&self) -> Vec<&str> {
        self.group_id.split('.').collect()
    }

    /// The canonical textual form: `group:artifact:version[:classifier]`.
    pub fn canonical(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}:{}:{}:{}",
                self.group_id,
                self.artifact_id,
                self.version.canonical(),
                c
            ),
            None => format!(
                "{}:{}:{}",
                self.group_id,
                self.artifact_id,
                self.version.canonical()
            ),
        }
    }
}

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coordinate::parse(s)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::settings;

    #[test]
    fn parses_three_field_coordinate() {
        let c = Coordinate::parse("com.ecosio:test-artefact:1.2.0").unwrap();
        assert_eq!(c.group_id(), "com.ecosio");
        assert_eq!(c.artifact_id(), "test-artefact");
        assert_eq!(c.classifier(), None);
    }

    #[test]
    fn trailing_colon_is_no_classifier() {
        let c = Coordinate::parse("a:b:4:").unwrap();
        assert_eq!(c.classifier(), None);
    }

    #[test]
    fn four_field_with_classifier() {
        let c = Coordinate::parse("a:b:4:sources").unwrap();
        assert_eq!(c.classifier(), Some("sources"));
    }

    #[test]
    fn wrong_field_count_rejected() {
        assert!(matches!(
            Coordinate::parse("a:b").unwrap_err(),
            ParseCoordinateError::WrongFieldCount(2)
        ));
        assert!(matches!(
            Coordinate::parse("a:b:1:c:d").unwrap_err(),
            ParseCoordinateError::WrongFieldCount(5)
        ));
    }

    #[test]
    fn empty_version_rejected() {
        assert!(matches!(
            Coordinate::parse("a:b:").unwrap_err(),
            ParseCoordinateError::EmptyField(CoordinateField::Version)
        ));
        assert!(matches!(
            Coordinate::parse("a:b::sources").unwrap_err(),
            ParseCoordinateError::EmptyField(CoordinateField::Version)
        ));
    }

    #[test]
    fn illegal_character_rejected() {
        assert!(matches!(
            Coordinate::parse("a b:artifact:1").unwrap_err(),
            ParseCoordinateError::IllegalCharacter { .. }
        ));
    }

    #[test]
    fn round_trip_canonical_form() {
        let c = Coordinate::parse("com.ecosio:test-artefact:1.2.0:sources").unwrap();
        let reparsed = Coordinate::parse(&c.canonical()).unwrap();
        assert_eq!(c, reparsed);
    }

    #[test]
    fn group_id_length_limit_is_enforced_and_resettable() {
        let s = settings();
        s.set_group_id_max_length(4);
        let err = Coordinate::parse("toolong:artifact:1").unwrap_err();
        assert!(matches!(err, ParseCoordinateError::FieldTooLong { .. }));
        s.reset_to_defaults();
        assert!(Coordinate::parse("toolong:artifact:1").is_ok());
    }
}
