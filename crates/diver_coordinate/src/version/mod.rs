//! Version algebra: [`StaticVersion`] (a `major.minor.micro-qualifier` tuple)
//! and [`Version`] (the `Static | Pseudo` sum type that participates in the
//! repository's total order).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

mod parse;
pub mod pseudo;

pub use parse::{ParseVersionError, ParseVersionErrorKind};
pub use pseudo::{register_pseudo, DuplicatePseudoError, PseudoComparator, LATEST, LATEST_RELEASE, OLDEST};

/// A static, numeric-triple-plus-qualifier version, e.g. `1.2.3-a`.
///
/// See spec.md §3 "Version" for the canonical string rules and §4.A for the
/// ordering rules.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct StaticVersion {
    major: u64,
    minor: u64,
    micro: u64,
    qualifier: Option<String>,
}

impl StaticVersion {
    pub fn new(major: u64, minor: u64, micro: u64, qualifier: Option<String>) -> Self {
        let qualifier = qualifier.filter(|q| !q.is_empty());
        Self {
            major,
            minor,
            micro,
            qualifier,
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn micro(&self) -> u64 {
        self.micro
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// `true` if the qualifier equals, or is suffixed by (case-insensitive),
    /// `SNAPSHOT`.
    pub fn is_snapshot(&self) -> bool {
        self.qualifier
            .as_deref()
            .map(|q| q.to_ascii_lowercase().ends_with("snapshot"))
            .unwrap_or(false)
    }

    /// The canonical textual form: trailing zero numeric components are
    /// dropped (but at least one is always kept) and a qualifier, if any, is
    /// joined with `-`. A pure-qualifier version (`0.0.0-x`) renders as just
    /// the qualifier.
    pub fn canonical(&self) -> String {
        if self.major == 0 && self.minor == 0 && self.micro == 0 {
            if let Some(q) = &self.qualifier {
                return q.clone();
            }
            return "0".to_string();
        }

        let components = [self.major, self.minor, self.micro];
        let mut len = 3;
        while len > 1 && components[len - 1] == 0 {
            len -= 1;
        }
        let numeric = components[..len].iter().map(u64::to_string).join(".");

        match &self.qualifier {
            Some(q) => format!("{numeric}-{q}"),
            None => numeric,
        }
    }
}

impl fmt::Display for StaticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl Ord for StaticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.micro)
            .cmp(&(other.major, other.minor, other.micro))
            .then_with(|| compare_qualifier(self.qualifier.as_deref(), other.qualifier.as_deref()))
    }
}

impl PartialOrd for StaticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares two optional qualifiers under the snapshot rule (spec.md §4.A):
/// an empty (`None`) qualifier is greater than every non-empty qualifier,
/// snapshot or not; two non-empty qualifiers fall back to case-insensitive
/// lexicographic order.
fn compare_qualifier(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            if a.eq_ignore_ascii_case(b) {
                Ordering::Equal
            } else {
                a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
            }
        }
    }
}

/// A pseudo-version: a registered sentinel such as `latest`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Pseudo {
    id: String,
}

impl Pseudo {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Pseudo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A version: either a [`StaticVersion`] or a [`Pseudo`] sentinel. Both
/// variants participate in one total order (spec.md §3/§4.A).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Version {
    Static(StaticVersion),
    Pseudo(Pseudo),
}

impl Version {
    /// Constructs the static version whose canonical textual form is
    /// equivalent to [`StaticVersion::canonical`].
    pub fn static_version(major: u64, minor: u64, micro: u64, qualifier: Option<String>) -> Self {
        Version::Static(StaticVersion::new(major, minor, micro, qualifier))
    }

    /// Looks up (or constructs) the pseudo-version for a registered id.
    /// Returns `None` if `id` is not registered.
    pub fn pseudo(id: &str) -> Option<Self> {
        pseudo::is_registered(id).then(|| {
            Version::Pseudo(Pseudo {
                id: id.to_string(),
            })
        })
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Version::Static(_))
    }

    pub fn is_pseudo(&self) -> bool {
        matches!(self, Version::Pseudo(_))
    }

    pub fn as_static(&self) -> Option<&StaticVersion> {
        match self {
            Version::Static(v) => Some(v),
            Version::Pseudo(_) => None,
        }
    }

    /// Parses a version string per spec.md §4.A: a registered pseudo-version
    /// id, else a static parse, else a pure-qualifier static version.
    pub fn parse(s: &str) -> Result<Self, ParseVersionError> {
        parse::parse_version(s)
    }

    /// The canonical textual form (spec.md §3).
    pub fn canonical(&self) -> String {
        match self {
            Version::Static(v) => v.canonical(),
            Version::Pseudo(p) => p.id.clone(),
        }
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Version::Static(a), Version::Static(b)) => a.cmp(b),
            (Version::Static(a), Version::Pseudo(p)) => pseudo::compare_static(&p.id, a).reverse(),
            (Version::Pseudo(p), Version::Static(b)) => pseudo::compare_static(&p.id, b),
            (Version::Pseudo(a), Version::Pseudo(b)) => {
                if a.id == b.id {
                    Ordering::Equal
                } else {
                    pseudo::compare_pseudo(&a.id, &b.id)
                }
            }
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", "1")]
    #[case("1.2", "1.2")]
    #[case("1.2.3.a", "1.2.3-a")]
    #[case("1.2.3.4.5", "1.2.3-4.5")]
    #[case("1.2.3.4.5.6.7.8", "1.2.3-4.5.6.7.8")]
    #[case("blafoo", "blafoo")]
    fn canonical_round_trip(#[case] input: &str, #[case] canonical: &str) {
        let v = Version::parse(input).unwrap();
        assert_eq!(v.canonical(), canonical);
        // Format(Parse(s)) == canonical(s), and re-parsing the canonical
        // form yields an equal version.
        let reparsed = Version::parse(&v.canonical()).unwrap();
        assert_eq!(reparsed.canonical(), canonical);
    }

    #[test]
    fn zero_leading_digit_is_rejected() {
        let err = Version::parse("0.09.5").unwrap_err();
        assert!(matches!(err.kind, ParseVersionErrorKind::LeadingZero));
    }

    #[test]
    fn pure_qualifier_version() {
        let v = Version::parse("blafoo").unwrap();
        let s = v.as_static().unwrap();
        assert_eq!((s.major(), s.minor(), s.micro()), (0, 0, 0));
        assert_eq!(s.qualifier(), Some("blafoo"));
    }

    #[test]
    fn snapshot_sorts_before_release() {
        let snapshot = Version::parse("1.0.0-SNAPSHOT").unwrap();
        let release = Version::parse("1.0.0").unwrap();
        let next = Version::parse("1.0.1").unwrap();
        let prev = Version::parse("0.9.9").unwrap();
        assert!(prev < snapshot);
        assert!(snapshot < release);
        assert!(release < next);
    }

    #[test]
    fn order_chain_ascending() {
        let mut versions: Vec<Version> = vec![
            Version::pseudo(OLDEST).unwrap(),
            Version::parse("1.2").unwrap(),
            Version::parse("1.2.3").unwrap(),
            Version::parse("1.2.4").unwrap(),
            Version::parse("1.3").unwrap(),
            Version::parse("2023.5").unwrap(),
            Version::pseudo(LATEST_RELEASE).unwrap(),
            Version::pseudo(LATEST).unwrap(),
        ];
        let expected = versions.clone();
        versions.sort();
        assert_eq!(versions, expected);
    }

    #[test]
    fn oldest_and_latest_bound_every_version() {
        let oldest = Version::pseudo(OLDEST).unwrap();
        let latest = Version::pseudo(LATEST).unwrap();
        let latest_release = Version::pseudo(LATEST_RELEASE).unwrap();
        let v = Version::parse("7.8.9").unwrap();
        assert!(oldest < v);
        assert!(v < latest);
        assert!(v < latest_release);
        assert!(latest_release < latest);
    }
}
