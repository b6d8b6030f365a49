use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::version::StaticVersion;

/// A comparator callback pair a [`Pseudo`] version registers against the
/// rest of the total order.
///
/// Implementations are looked up by id through the process-wide
/// [`registry`]; see that function's docs for the extensibility contract.
pub trait PseudoComparator: fmt::Debug + Send + Sync {
    /// Orders this pseudo-version against a static version.
    fn compare_static(&self, other: &StaticVersion) -> Ordering;

    /// Orders this pseudo-version against another pseudo-version identified
    /// by `other_id`. Return `None` to let the other side's comparator
    /// decide instead (the registry tries the other direction, reversed,
    /// before falling back to `Equal`).
    fn compare_pseudo(&self, other_id: &str) -> Option<Ordering>;
}

/// The three built-in ids that are always present in the registry.
pub const OLDEST: &str = "oldest";
pub const LATEST_RELEASE: &str = "latest-release";
pub const LATEST: &str = "latest";

#[derive(Debug)]
struct Oldest;

impl PseudoComparator for Oldest {
    fn compare_static(&self, _other: &StaticVersion) -> Ordering {
        Ordering::Less
    }

    fn compare_pseudo(&self, other_id: &str) -> Option<Ordering> {
        Some(if other_id == OLDEST {
            Ordering::Equal
        } else {
            Ordering::Less
        })
    }
}

#[derive(Debug)]
struct LatestRelease;

impl PseudoComparator for LatestRelease {
    fn compare_static(&self, _other: &StaticVersion) -> Ordering {
        Ordering::Greater
    }

    fn compare_pseudo(&self, other_id: &str) -> Option<Ordering> {
        match other_id {
            LATEST_RELEASE => Some(Ordering::Equal),
            OLDEST => Some(Ordering::Greater),
            LATEST => Some(Ordering::Less),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Latest;

impl PseudoComparator for Latest {
    fn compare_static(&self, _other: &StaticVersion) -> Ordering {
        Ordering::Greater
    }

    fn compare_pseudo(&self, other_id: &str) -> Option<Ordering> {
        Some(if other_id == LATEST {
            Ordering::Equal
        } else {
            Ordering::Greater
        })
    }
}

/// Error returned when registering a pseudo-version id that is already
/// taken.
#[derive(Debug, thiserror::Error, Clone, Eq, PartialEq)]
#[error("a pseudo-version with id '{0}' is already registered")]
pub struct DuplicatePseudoError(pub String);

struct Registry {
    entries: RwLock<HashMap<String, Arc<dyn PseudoComparator>>>,
}

impl Registry {
    fn new() -> Self {
        let mut entries: HashMap<String, Arc<dyn PseudoComparator>> = HashMap::new();
        entries.insert(OLDEST.to_string(), Arc::new(Oldest));
        entries.insert(LATEST_RELEASE.to_string(), Arc::new(LatestRelease));
        entries.insert(LATEST.to_string(), Arc::new(Latest));
        Self {
            entries: RwLock::new(entries),
        }
    }
}

static REGISTRY: std::sync::OnceLock<Registry> = std::sync::OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Registers a custom pseudo-version id with the process-wide registry.
///
/// Registration is expected to happen once at startup; after that, readers
/// see a stable snapshot (per spec.md §5 "Shared state"). Re-registering an
/// id that is already taken (including one of the three built-ins) is
/// rejected rather than silently overwriting the previous comparator.
pub fn register_pseudo(
    id: impl Into<String>,
    comparator: Arc<dyn PseudoComparator>,
) -> Result<(), DuplicatePseudoError> {
    let id = id.into();
    let mut entries = registry()
        .entries
        .write()
        .expect("pseudo-version registry lock poisoned");
    if entries.contains_key(&id) {
        return Err(DuplicatePseudoError(id));
    }
    entries.insert(id, comparator);
    Ok(())
}

/// Returns `true` if `id` is a registered pseudo-version.
pub fn is_registered(id: &str) -> bool {
    registry()
        .entries
        .read()
        .expect("pseudo-version registry lock poisoned")
        .contains_key(id)
}

fn comparator_for(id: &str) -> Option<Arc<dyn PseudoComparator>> {
    registry()
        .entries
        .read()
        .expect("pseudo-version registry lock poisoned")
        .get(id)
        .cloned()
}

/// Orders a registered pseudo-version against a static version.
///
/// Panics if `id` is not registered; callers are expected to only construct
/// [`crate::version::Version::Pseudo`] values through
/// [`crate::version::Version::parse`], which already validates
/// registration.
pub fn compare_static(id: &str, other: &StaticVersion) -> Ordering {
    comparator_for(id)
        .unwrap_or_else(|| panic!("pseudo-version '{id}' is not registered"))
        .compare_static(other)
}

/// Orders two registered pseudo-versions against each other.
pub fn compare_pseudo(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let a_cmp = comparator_for(a);
    let b_cmp = comparator_for(b);
    if let Some(ord) = a_cmp.as_ref().and_then(|c| c.compare_pseudo(b)) {
        return ord;
    }
    if let Some(ord) = b_cmp.as_ref().and_then(|c| c.compare_pseudo(a)) {
        return ord.reverse();
    }
    tracing::warn!(a, b, "neither pseudo-version comparator could order the other; treating as equal");
    Ordering::Equal
}
