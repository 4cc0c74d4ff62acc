//! Tool and document-format version

use once_cell::sync::Lazy;
use semver::Version;

/// The tool version, doubling as the document format version
///
/// Incompatible format changes bump the major number; a document or
/// configuration is accepted when its major number matches ours.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static PARSED: Lazy<Version> =
    Lazy::new(|| Version::parse(VERSION).expect("crate version is valid semver"));

/// The parsed form of [`VERSION`]
pub fn version() -> &'static Version {
    &PARSED
}

/// Check major-version compatibility with [`VERSION`]
pub fn compatible(other: &Version) -> bool {
    other.major == PARSED.major
}
