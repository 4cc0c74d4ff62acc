//! Document identifiers
//!
//! A [`Uri`] is the string form of a document identifier: either a
//! `file://` URL or a bare filesystem path. The scanner and the LSP
//! layer both address documents through it, so it stays a thin wrapper
//! and only touches the filesystem when explicitly asked to.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

/// The scheme used by local files
pub const SCHEME_FILE: &str = "file";

/// A document identifier, `file://` URL or bare path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(String);

impl Uri {
    /// Wrap a string as a URI without interpretation
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Build a `file://` URI from a filesystem path
    ///
    /// Relative paths cannot be expressed as URLs and are kept verbatim.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Url::from_file_path(path) {
            Ok(url) => Self(url.to_string()),
            Err(()) => Self(path.to_string_lossy().into_owned()),
        }
    }

    /// The raw string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the URI is the empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The scheme, if the URI has one (`file://x` → `Some("file")`)
    pub fn scheme(&self) -> Option<&str> {
        let idx = self.0.find("://")?;
        Some(&self.0[..idx])
    }

    /// Map the URI to a local filesystem path
    ///
    /// Bare paths map to themselves; any scheme other than `file` is an
    /// error.
    pub fn to_file_path(&self) -> io::Result<PathBuf> {
        match self.scheme() {
            None => Ok(PathBuf::from(&self.0)),
            Some(SCHEME_FILE) => {
                let url = Url::parse(&self.0)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
                url.to_file_path().map_err(|()| {
                    io::Error::new(io::ErrorKind::InvalidInput, "not a local file URL")
                })
            }
            Some(other) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported scheme: {other}"),
            )),
        }
    }

    /// Check if the URI points at an existing file or directory
    pub fn exists(&self) -> bool {
        self.to_file_path().map(|p| p.exists()).unwrap_or(false)
    }

    /// Read the full contents of the document
    pub fn read_bytes(&self) -> io::Result<Vec<u8>> {
        std::fs::read(self.to_file_path()?)
    }

    /// Write `data` to the document, replacing previous contents
    pub fn write_all(&self, data: &[u8]) -> io::Result<()> {
        std::fs::write(self.to_file_path()?, data)
    }

    /// Append a path segment
    pub fn join(&self, segment: &str) -> Uri {
        if self.0.ends_with('/') {
            Uri(format!("{}{}", self.0, segment))
        } else {
            Uri(format!("{}/{}", self.0, segment))
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Uri {
    fn from(s: String) -> Self {
        Self(s)
    }
}
