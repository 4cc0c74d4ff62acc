//! Document serialization
//!
//! The tree serializes back to `apidoc` XML through the schema
//! encoders. Output carries the XML declaration, optionally an
//! `xml-stylesheet` instruction, and the format version stamped on the
//! root element so consumers can check compatibility.

use srcdoc_core::version;
use srcdoc_xml::{EncodeXml, XmlWriter};

use crate::attr::{DocVersionAttribute, DocVersionValue};
use crate::elements::ApiDoc;

impl ApiDoc {
    /// Serialize to `apidoc` XML
    ///
    /// `stylesheet` adds an `xml-stylesheet` instruction pointing at an
    /// XSL transform for static rendering.
    pub fn to_xml(&self, stylesheet: Option<&str>) -> String {
        let mut w = XmlWriter::new();
        w.instruction("xml", r#"version="1.0" encoding="UTF-8""#);
        if let Some(href) = stylesheet {
            w.instruction(
                "xml-stylesheet",
                &format!(r#"type="text/xsl" href="{href}""#),
            );
        }

        if self.apidoc.is_none() {
            let mut doc = self.clone();
            doc.apidoc = Some(DocVersionAttribute::synthesized(
                version::VERSION,
                DocVersionValue(version::version().clone()),
            ));
            doc.encode(&mut w, "apidoc");
        } else {
            self.encode(&mut w, "apidoc");
        }
        w.finish()
    }
}
