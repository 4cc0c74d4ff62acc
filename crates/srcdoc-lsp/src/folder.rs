//! Per-workspace-folder state
//!
//! Each workspace folder owns its own merged document and
//! configuration. The editor surface is four operations: open, change,
//! close, lookup. Open and change re-scan one file's text and merge
//! the result; close retracts the file; lookup answers hovers.

use srcdoc_ast::ApiDoc;
use srcdoc_build::{Config, Input};
use srcdoc_core::{MessageHandler, Position, Uri};
use srcdoc_xml::Tip;

/// One workspace folder: configuration plus the merged document
pub struct Folder {
    /// The folder root
    pub uri: Uri,

    /// The merged documentation tree for this folder
    pub doc: ApiDoc,

    /// Loaded or detected configuration; `None` when the folder has no
    /// recognizable sources
    pub config: Option<Config>,
}

impl Folder {
    /// Open a folder, loading `.srcdoc.yaml` or detecting languages
    pub fn new(uri: Uri) -> Self {
        let config = Config::load(&uri)
            .or_else(|_| Config::detect(&uri, true).and_then(|mut c| {
                c.sanitize(&uri).map(|()| c)
            }))
            .ok();
        Self {
            uri,
            doc: ApiDoc::default(),
            config,
        }
    }

    /// Whether a document belongs to this folder
    pub fn matches(&self, uri: &Uri) -> bool {
        uri.as_str().starts_with(self.uri.as_str())
    }

    /// The input whose extensions claim this document, if any
    fn input_for(&self, uri: &Uri) -> Option<&Input> {
        let name = uri.as_str();
        let ext_at = name.rfind('.')?;
        let ext = &name[ext_at..];
        self.config
            .as_ref()?
            .inputs
            .iter()
            .find(|i| i.matches_ext(ext))
    }

    /// A document was opened with the given text
    pub fn open(&mut self, h: &MessageHandler, uri: &Uri, text: &[u8]) {
        self.change(h, uri, text);
    }

    /// A document's text changed; re-scan and re-merge it
    pub fn change(&mut self, h: &MessageHandler, uri: &Uri, text: &[u8]) {
        self.doc.delete_uri(uri);
        let Some(input) = self.input_for(uri) else {
            return;
        };
        let blocks = input.scan_file(h, uri, text.to_vec());
        for block in blocks {
            self.doc.parse(h, &block);
        }
    }

    /// A document was closed; retract everything it contributed
    pub fn close(&mut self, uri: &Uri) {
        self.doc.delete_uri(uri);
    }

    /// The innermost documented node at a position, for hovers
    pub fn lookup(&self, uri: &Uri, pos: Position) -> Option<Tip> {
        self.doc.search(uri, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn folder_with_go() -> (tempfile::TempDir, Folder) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("seed.go"), "package a\n").unwrap();
        let uri = Uri::from_path(tmp.path());
        let folder = Folder::new(uri);
        (tmp, folder)
    }

    #[test]
    fn test_detects_config_without_file() {
        let (_tmp, folder) = folder_with_go();
        assert!(folder.config.is_some());
    }

    #[test]
    fn test_open_change_close_lookup() {
        let (tmp, mut folder) = folder_with_go();
        let h = MessageHandler::discard();
        let file = Uri::from_path(tmp.path().join("api.go"));

        folder.open(
            &h,
            &file,
            b"// <api method=\"GET\" summary=\"x\">\n// <path path=\"/x\"/>\n// </api>\n",
        );
        assert_eq!(folder.doc.apis.len(), 1);

        // Hover on the method attribute (line 0, inside `method="GET"`).
        let tip = folder.lookup(&file, Position::new(0, 12, 0));
        assert_eq!(tip.unwrap().usage, "usage-api-method");

        // Change to a different route.
        folder.change(
            &h,
            &file,
            b"// <api method=\"POST\">\n// <path path=\"/y\"/>\n// </api>\n",
        );
        assert_eq!(folder.doc.apis.len(), 1);
        assert_eq!(folder.doc.apis[0].method.as_ref().unwrap().method(), "POST");

        folder.close(&file);
        assert!(folder.doc.apis.is_empty());
        h.stop();
    }

    #[test]
    fn test_unclaimed_extension_is_ignored() {
        let (tmp, mut folder) = folder_with_go();
        let h = MessageHandler::discard();
        let file = Uri::from_path(tmp.path().join("readme.md"));
        folder.open(&h, &file, b"# <api method=\"GET\"/>\n");
        assert!(folder.doc.apis.is_empty());
        h.stop();
    }

    #[test]
    fn test_matches_prefix() {
        let (_tmp, folder) = folder_with_go();
        let inside = folder.uri.join("sub/x.go");
        assert!(folder.matches(&inside));
        assert!(!folder.matches(&Uri::new("file:///elsewhere/x.go")));
    }
}
