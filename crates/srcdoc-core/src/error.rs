//! Syntax errors and their localization keys
//!
//! The core never renders user-facing strings: every error carries an
//! [`ErrorKind`] whose stable key the host resolves against its own
//! catalog. The `Display` impl exists for logs and tests only.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::position::{Location, Position, Range};
use crate::uri::Uri;

/// What went wrong, as a closed set the host can localize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A required attribute, element or value is missing or empty
    Required,
    /// A value does not parse as its declared format
    InvalidFormat,
    /// A value parses but is outside its allowed domain
    InvalidValue,
    /// An element name is not part of the schema at this point
    InvalidTag,
    /// An attribute name is not part of the schema at this point
    InvalidAttribute,
    /// Structurally broken XML
    InvalidXml,
    /// An entity reference outside the five predefined ones
    InvalidEntity,
    /// A start tag without its matching end tag
    NotFoundEndTag,
    /// A comment or string opened but never closed
    NotFoundEndFlag,
    /// A value that must be unique appeared twice
    DuplicateValue,
    /// A tag that may appear once appeared twice
    DuplicateTag,
    /// An encoding label the platform does not know
    UnsupportedEncoding,
    /// A language id the registry does not know
    UnsupportedLang,
    /// An input directory that does not exist
    DirNotExists,
    /// An input directory with no matching files
    DirIsEmpty,
    /// A URI scheme other than `file`
    InvalidUriScheme,
    /// A version whose major number differs from ours
    VersionIncompatible,
}

impl ErrorKind {
    /// The stable localization key for this kind
    pub fn key(&self) -> &'static str {
        match self {
            ErrorKind::Required => "err-required",
            ErrorKind::InvalidFormat => "err-invalid-format",
            ErrorKind::InvalidValue => "err-invalid-value",
            ErrorKind::InvalidTag => "err-invalid-tag",
            ErrorKind::InvalidAttribute => "err-invalid-attribute",
            ErrorKind::InvalidXml => "err-invalid-xml",
            ErrorKind::InvalidEntity => "err-invalid-entity",
            ErrorKind::NotFoundEndTag => "err-not-found-end-tag",
            ErrorKind::NotFoundEndFlag => "err-not-found-end-flag",
            ErrorKind::DuplicateValue => "err-duplicate-value",
            ErrorKind::DuplicateTag => "err-duplicate-tag",
            ErrorKind::UnsupportedEncoding => "err-unsupported-encoding",
            ErrorKind::UnsupportedLang => "err-unsupported-lang",
            ErrorKind::DirNotExists => "err-dir-not-exists",
            ErrorKind::DirIsEmpty => "err-dir-is-empty",
            ErrorKind::InvalidUriScheme => "err-invalid-uri-scheme",
            ErrorKind::VersionIncompatible => "err-version-incompatible",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A range-pinned, localizable syntax error
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{kind} ({field}) at {location}")]
pub struct SyntaxError {
    /// Where the error occurred
    pub location: Location,

    /// The schema field the error refers to, when there is one
    pub field: String,

    /// The localizable kind
    pub kind: ErrorKind,

    /// Arguments for the localized message
    pub args: Vec<String>,
}

impl SyntaxError {
    /// Create an error pinned to a full location
    pub fn new(location: Location, field: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            location,
            field: field.into(),
            kind,
            args: Vec::new(),
        }
    }

    /// Create an error pinned to a range inside `uri`
    pub fn at(uri: Uri, start: Position, end: Position, field: impl Into<String>, kind: ErrorKind) -> Self {
        Self::new(Location::new(uri, Range::new(start, end)), field, kind)
    }

    /// Attach message arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}
