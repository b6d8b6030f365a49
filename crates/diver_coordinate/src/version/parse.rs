use thiserror::Error;

use super::{pseudo, Pseudo, StaticVersion, Version};

/// Error returned by [`Version::parse`](super::Version::parse).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("malformed version string '{version}': {kind}")]
pub struct ParseVersionError {
    pub version: String,
    pub kind: ParseVersionErrorKind,
}

impl ParseVersionError {
    fn new(version: &str, kind: ParseVersionErrorKind) -> Self {
        Self {
            version: version.to_string(),
            kind,
        }
    }
}

/// The specific reason a version string failed to parse.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseVersionErrorKind {
    /// A numeric segment among the first three had a leading zero despite
    /// being more than one digit long, e.g. the `09` in `0.09.5`.
    #[error("numeric version segment has a leading zero")]
    LeadingZero,

    /// A numeric segment did not fit in a `u64`.
    #[error("numeric version segment is too large")]
    Overflow,
}

/// Parses a version string per spec.md §4.A, first-match-wins:
///
/// 1. A registered pseudo-version id.
/// 2. A static parse: up to three leading `.`-separated numeric segments
///    become `major.minor.micro`; anything left over (after stripping one
///    optional `.`/`-` separator) becomes the qualifier.
/// 3. Otherwise, the whole string becomes a pure-qualifier static version
///    `(0, 0, 0, s)`.
pub fn parse_version(s: &str) -> Result<Version, ParseVersionError> {
    if pseudo::is_registered(s) {
        return Ok(Version::Pseudo(Pseudo { id: s.to_string() }));
    }

    match parse_static(s)? {
        Some(v) => Ok(Version::Static(v)),
        None => Ok(Version::Static(StaticVersion::new(
            0,
            0,
            0,
            Some(s.to_string()),
        ))),
    }
}

/// Attempts the static-version parse described by rule 2 above.
///
/// Returns `Ok(None)` when the string does not even begin with a numeric
/// segment (so the caller should fall back to rule 3), and `Err` only when
/// a numeric segment among the first three was malformed (leading zero or
/// overflow).
fn parse_static(s: &str) -> Result<Option<StaticVersion>, ParseVersionError> {
    let bytes = s.as_bytes();
    let mut pos = 0usize;
    let mut segments: Vec<u64> = Vec::with_capacity(3);

    while segments.len() < 3 {
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == start {
            // No digits here; stop scanning numeric segments.
            break;
        }
        let digits = &s[start..pos];
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(ParseVersionError::new(s, ParseVersionErrorKind::LeadingZero));
        }
        let value: u64 = digits
            .parse()
            .map_err(|_| ParseVersionError::new(s, ParseVersionErrorKind::Overflow))?;
        segments.push(value);

        if pos == bytes.len() {
            break;
        }
        if bytes[pos] == b'.' && segments.len() < 3 {
            pos += 1;
            continue;
        }
        break;
    }

    if segments.is_empty() {
        return Ok(None);
    }

    let qualifier = if pos < bytes.len() {
        let rest_start = if bytes[pos] == b'.' || bytes[pos] == b'-' {
            pos + 1
        } else {
            pos
        };
        let rest = &s[rest_start..];
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    } else {
        None
    };

    while segments.len() < 3 {
        segments.push(0);
    }

    Ok(Some(StaticVersion::new(
        segments[0],
        segments[1],
        segments[2],
        qualifier,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_leading_zero_in_second_segment() {
        assert!(matches!(
            parse_static("0.09.5").unwrap_err().kind,
            ParseVersionErrorKind::LeadingZero
        ));
    }

    #[test]
    fn single_zero_segment_is_fine() {
        let v = parse_static("0.9.9").unwrap().unwrap();
        assert_eq!((v.major(), v.minor(), v.micro()), (0, 9, 9));
    }

    #[test]
    fn non_numeric_start_yields_none() {
        assert_eq!(parse_static("blafoo").unwrap(), None);
    }

    #[test]
    fn extra_segments_become_qualifier() {
        let v = parse_static("1.2.3.4.5").unwrap().unwrap();
        assert_eq!((v.major(), v.minor(), v.micro()), (1, 2, 3));
        assert_eq!(v.qualifier(), Some("4.5"));
    }

    #[test]
    fn dash_separator_before_qualifier() {
        let v = parse_static("1.2.3-a").unwrap().unwrap();
        assert_eq!(v.qualifier(), Some("a"));
    }
}
