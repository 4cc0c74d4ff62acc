//! Output descriptors and formatting
//!
//! Where the merged document goes and in which shape: `apidoc` XML
//! (the round-tripping native format), OpenAPI 3 as JSON or YAML, or
//! `rslt`, a structured JSON dump of the decoded tree.

use serde::{Deserialize, Serialize};
use srcdoc_ast::ApiDoc;
use srcdoc_core::{ErrorKind, Location, Range, SyntaxError, Uri};

use crate::openapi;

/// The serialization format of the output document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// Native `apidoc` XML
    #[default]
    #[serde(rename = "apidoc")]
    Apidoc,
    /// OpenAPI 3 as JSON
    #[serde(rename = "openapi+json")]
    OpenapiJson,
    /// OpenAPI 3 as YAML
    #[serde(rename = "openapi+yaml")]
    OpenapiYaml,
    /// JSON dump of the decoded tree, ranges included
    #[serde(rename = "rslt")]
    Rslt,
}

/// Where and how to write the merged document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Output {
    /// Output file; `file://` URI or bare path
    pub path: Uri,

    /// Serialization format
    #[serde(default, rename = "type")]
    pub kind: OutputKind,

    /// `xml-stylesheet` href to embed; `apidoc` output only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Output {
    /// Validate the descriptor, resolving a relative path against `base`
    pub fn sanitize(&mut self, base: &Uri) -> Result<(), SyntaxError> {
        let field_error = |field: &str, kind| {
            SyntaxError::new(Location::new(base.clone(), Range::default()), field, kind)
        };

        if self.path.is_empty() {
            return Err(field_error("output.path", ErrorKind::Required));
        }
        match self.path.scheme() {
            None => {
                if !self.path.as_str().starts_with('/') && !base.is_empty() {
                    let resolved = base.join(self.path.as_str());
                    self.path = resolved;
                }
            }
            Some("file") => {}
            Some(_) => return Err(field_error("output.path", ErrorKind::InvalidUriScheme)),
        }
        Ok(())
    }

    /// Serialize the document in the configured format
    pub fn buffer(&self, doc: &ApiDoc) -> Result<Vec<u8>, SyntaxError> {
        let format_error = |e: String| {
            SyntaxError::new(
                Location::new(self.path.clone(), Range::default()),
                "output",
                ErrorKind::InvalidFormat,
            )
            .with_args([e])
        };

        match self.kind {
            OutputKind::Apidoc => Ok(doc.to_xml(self.style.as_deref()).into_bytes()),
            OutputKind::Rslt => {
                serde_json::to_vec_pretty(doc).map_err(|e| format_error(e.to_string()))
            }
            OutputKind::OpenapiJson => {
                let value = openapi::convert(doc);
                serde_json::to_vec_pretty(&value).map_err(|e| format_error(e.to_string()))
            }
            OutputKind::OpenapiYaml => {
                let value = openapi::convert(doc);
                serde_yaml::to_string(&value)
                    .map(String::into_bytes)
                    .map_err(|e| format_error(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_names() {
        let kinds: Vec<OutputKind> =
            serde_yaml::from_str("[apidoc, openapi+json, openapi+yaml, rslt]").unwrap();
        assert_eq!(
            kinds,
            vec![
                OutputKind::Apidoc,
                OutputKind::OpenapiJson,
                OutputKind::OpenapiYaml,
                OutputKind::Rslt
            ]
        );
    }

    #[test]
    fn test_sanitize_requires_path() {
        let mut o = Output::default();
        let err = o.sanitize(&Uri::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Required);
    }

    #[test]
    fn test_sanitize_rejects_remote_path() {
        let mut o = Output {
            path: Uri::new("ftp://example.com/out.xml"),
            ..Output::default()
        };
        let err = o.sanitize(&Uri::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidUriScheme);
    }

    #[test]
    fn test_sanitize_resolves_relative_path() {
        let mut o = Output {
            path: Uri::new("out.xml"),
            ..Output::default()
        };
        o.sanitize(&Uri::new("/proj")).unwrap();
        assert_eq!(o.path.as_str(), "/proj/out.xml");
    }

    #[test]
    fn test_buffer_formats() {
        let doc = ApiDoc::default();

        let o = Output {
            kind: OutputKind::Apidoc,
            ..Output::default()
        };
        let xml = o.buffer(&doc).unwrap();
        assert!(xml.starts_with(b"<?xml"));

        let o = Output {
            kind: OutputKind::Rslt,
            ..Output::default()
        };
        let json = o.buffer(&doc).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&json).is_ok());

        let o = Output {
            kind: OutputKind::OpenapiJson,
            ..Output::default()
        };
        let json = o.buffer(&doc).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(v["openapi"], "3.0.3");
    }
}
