//! Version selection for the x07 sparse-index client
//!
//! Picks the "latest usable" version out of a package's index entries:
//! yanked entries and entries whose version is not valid semver are
//! ignored, the rest are ranked by semver precedence.

pub mod select;

pub use select::{latest_usable_version, parse_version, VersionSelector};
pub use semver::{Version, VersionReq};
