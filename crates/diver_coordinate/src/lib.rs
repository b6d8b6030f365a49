//! Coordinate and version algebra for the `diver` artifact repository.
//!
//! This crate is the leaf of the `diver` workspace: parsing, normalising,
//! and ordering Maven-style coordinates and versions, including the
//! extensible pseudo-version registry (`latest`, `latest-release`,
//! `oldest`, and custom sentinels). Nothing here does I/O.

mod coordinate;
pub mod settings;
mod version;

pub use coordinate::{Coordinate, CoordinateField, ParseCoordinateError};
pub use settings::{CoordinateSettings, DEFAULT_MAX_FIELD_LENGTH, MIN_FIELD_LENGTH};
pub use version::pseudo::{register_pseudo, DuplicatePseudoError, PseudoComparator, LATEST, LATEST_RELEASE, OLDEST};
pub use version::{ParseVersionError, ParseVersionErrorKind, Pseudo, StaticVersion, Version};
