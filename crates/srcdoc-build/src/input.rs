//! Input descriptors
//!
//! An [`Input`] names a language, a directory and the extensions to
//! pick up. Sanitizing resolves the concrete file list and the text
//! encoding; scanning turns one file's bytes into documentation
//! blocks.

use serde::{Deserialize, Serialize};
use srcdoc_core::{Block, ErrorKind, Location, MessageHandler, Range, SyntaxError, Uri};
use srcdoc_lang::registry;
use walkdir::WalkDir;

/// One source tree to scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Input {
    /// Registered language id, e.g. `go`
    pub lang: String,

    /// Directory to scan; `file://` URI or bare path
    pub dir: Uri,

    /// File extensions to pick up; language defaults when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exts: Vec<String>,

    /// Whether to descend into subdirectories
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recursive: bool,

    /// IANA encoding label; UTF-8 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    #[serde(skip)]
    pub paths: Vec<Uri>,
}

fn field_error(uri: &Uri, field: &str, kind: ErrorKind) -> SyntaxError {
    SyntaxError::new(
        Location::new(uri.clone(), Range::default()),
        field,
        kind,
    )
}

impl Input {
    /// Validate the descriptor and resolve the file list
    ///
    /// Relative directories resolve against `base` (the configuration
    /// file's directory).
    pub fn sanitize(&mut self, base: &Uri) -> Result<(), SyntaxError> {
        if self.lang.is_empty() {
            return Err(field_error(base, "lang", ErrorKind::Required));
        }
        let Some(language) = registry::get(&self.lang) else {
            return Err(field_error(base, "lang", ErrorKind::UnsupportedLang)
                .with_args([self.lang.clone()]));
        };

        if self.dir.is_empty() {
            return Err(field_error(base, "dir", ErrorKind::Required));
        }
        match self.dir.scheme() {
            None => {
                if !self.dir.as_str().starts_with('/') && !base.is_empty() {
                    let resolved = base.join(self.dir.as_str());
                    self.dir = resolved;
                }
            }
            Some("file") => {}
            Some(_) => return Err(field_error(base, "dir", ErrorKind::InvalidUriScheme)),
        }
        if !self.dir.exists() {
            return Err(field_error(base, "dir", ErrorKind::DirNotExists));
        }

        if self.exts.is_empty() {
            self.exts = language.exts.iter().map(|e| e.to_string()).collect();
        } else {
            self.exts = self
                .exts
                .iter()
                .filter(|e| !e.is_empty())
                .map(|e| {
                    if e.starts_with('.') {
                        e.clone()
                    } else {
                        format!(".{e}")
                    }
                })
                .collect();
        }

        self.paths = self.walk(base)?;
        if self.paths.is_empty() {
            return Err(field_error(base, "dir", ErrorKind::DirIsEmpty));
        }

        if let Some(label) = &self.encoding {
            if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
                return Err(field_error(base, "encoding", ErrorKind::UnsupportedEncoding)
                    .with_args([label.clone()]));
            }
        }

        Ok(())
    }

    fn walk(&self, base: &Uri) -> Result<Vec<Uri>, SyntaxError> {
        let root = self
            .dir
            .to_file_path()
            .map_err(|_| field_error(base, "dir", ErrorKind::InvalidUriScheme))?;

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut paths = Vec::new();
        for entry in WalkDir::new(&root)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if self.exts.iter().any(|ext| name.ends_with(ext.as_str())) {
                paths.push(Uri::from_path(entry.path()));
            }
        }
        Ok(paths)
    }

    /// The resolved file list; empty before [`Input::sanitize`]
    pub fn paths(&self) -> &[Uri] {
        &self.paths
    }

    /// Decode raw file bytes to UTF-8 text
    ///
    /// A BOM wins over the configured label; the label wins over the
    /// UTF-8 default. Malformed sequences are replaced and reported as
    /// a warning.
    pub fn decode_bytes(&self, h: &MessageHandler, uri: &Uri, data: Vec<u8>) -> Vec<u8> {
        let configured = self
            .encoding
            .as_ref()
            .and_then(|l| encoding_rs::Encoding::for_label(l.as_bytes()))
            .unwrap_or(encoding_rs::UTF_8);
        let encoding = encoding_rs::Encoding::for_bom(&data)
            .map(|(e, _)| e)
            .unwrap_or(configured);

        let (text, _, had_errors) = encoding.decode(&data);
        if had_errors {
            h.warn(
                SyntaxError::new(
                    Location::new(uri.clone(), Range::default()),
                    "encoding",
                    ErrorKind::UnsupportedEncoding,
                )
                .with_args([encoding.name().to_string()]),
            );
        }
        text.into_owned().into_bytes()
    }

    /// Scan one file's decoded bytes into documentation blocks
    pub fn scan_file(&self, h: &MessageHandler, uri: &Uri, data: Vec<u8>) -> Vec<Block> {
        let Some(language) = registry::get(&self.lang) else {
            return Vec::new();
        };
        let file = Block::new(Location::new(uri.clone(), Range::default()), data);
        let mut blocks = Vec::new();
        srcdoc_lang::scan(&file, &language.blockers(), h, |b| blocks.push(b));
        blocks
    }

    /// Read, decode and scan one file
    pub fn parse_file(&self, h: &MessageHandler, uri: &Uri) -> Vec<Block> {
        let data = match uri.to_file_path().and_then(std::fs::read) {
            Ok(data) => data,
            Err(e) => {
                let kind = if e.kind() == std::io::ErrorKind::NotFound {
                    ErrorKind::DirNotExists
                } else {
                    ErrorKind::InvalidValue
                };
                h.error(
                    SyntaxError::new(
                        Location::new(uri.clone(), Range::default()),
                        "",
                        kind,
                    )
                    .with_args([e.to_string()]),
                );
                return Vec::new();
            }
        };
        let data = self.decode_bytes(h, uri, data);
        self.scan_file(h, uri, data)
    }

    /// Whether this input claims files with the given extension
    pub fn matches_ext(&self, ext: &str) -> bool {
        self.exts.iter().any(|e| e == ext)
    }
}
