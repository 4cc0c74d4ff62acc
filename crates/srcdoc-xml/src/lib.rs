//! srcdoc-xml - Positional XML tokenizer and schema-driven decoder
//!
//! The tokenizer ([`parser::Parser`]) turns a comment-block payload
//! into position-carrying tokens. The decode driver ([`decode`]) walks
//! those tokens against a schema declared with [`xml_node!`], which
//! expands one declaration per element type into the decode hooks, the
//! position-lookup descent ([`search`]) and the XML encoder
//! ([`writer`]).

pub mod decode;
pub mod parser;
pub mod schema;
pub mod search;
pub mod token;
pub mod writer;

// Re-exported for the generated code.
pub use srcdoc_core::{Position, Range};

pub use decode::{
    decode_element, decode_root, skip_element, AttrBase, AttrDecoder, CDataMember, ContentMember,
    DecodeXml, Decoder, NodeBase, Sanitize, Unwind,
};
pub use parser::Parser;
pub use search::{Search, Tip};
pub use token::{Attribute, EndElement, Instruction, Name, SpannedString, StartElement, Token};
pub use writer::{needs_cdata, EncodeXml, XmlWriter};

#[cfg(test)]
mod tests {
    use crate::decode::{decode_root, AttrBase, AttrDecoder, ContentMember, Sanitize};
    use crate::search::{Search, Tip};
    use crate::token::{Attribute, SpannedString};
    use crate::writer::{EncodeXml, XmlWriter};
    use srcdoc_core::{
        Block, ErrorKind, Location, Message, MessageHandler, Position, Range, Severity,
        SyntaxError, Uri,
    };
    use std::sync::mpsc::channel;

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
    struct TestAttr {
        base: AttrBase,
        raw: String,
    }

    impl AttrDecoder for TestAttr {
        fn decode_attr(&mut self, _uri: &Uri, attr: &Attribute) -> Result<(), SyntaxError> {
            self.raw = attr.value.value.clone();
            Ok(())
        }

        fn encode_value(&self) -> String {
            self.raw.clone()
        }

        fn is_empty_value(&self) -> bool {
            self.raw.is_empty()
        }

        fn base_mut(&mut self) -> &mut AttrBase {
            &mut self.base
        }
    }

    impl Search for TestAttr {
        fn search_tip(&self, pos: Position) -> Option<Tip> {
            self.base.tip_at(pos)
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
    struct TestContent {
        value: String,
        range: Range,
        usage: &'static str,
    }

    impl ContentMember for TestContent {
        fn from_text(value: &SpannedString, usage: &'static str) -> Self {
            Self {
                value: value.value.trim().to_string(),
                range: value.range,
                usage,
            }
        }

        fn content_text(&self) -> &str {
            &self.value
        }
    }

    impl Search for TestContent {
        fn search_tip(&self, _pos: Position) -> Option<Tip> {
            None
        }
    }

    crate::xml_node! {
        /// Leaf node for driver tests.
        pub struct Leaf {
            tag = "leaf", usage = "usage-leaf";
            attr name: TestAttr => ("name", "usage-leaf-name", required);
            content text: TestContent => ("usage-leaf-text", omitempty);
        }
    }

    impl Sanitize for Leaf {}

    crate::xml_node! {
        /// Root node for driver tests.
        pub struct Root {
            tag = "root", usage = "usage-root";
            attr id: TestAttr => ("id", "usage-root-id", omitempty);
            elem first: Leaf => ("first", "usage-root-first", required);
            list items: Leaf => ("item", "usage-root-items", omitempty);
        }
    }

    impl Sanitize for Root {}

    fn decode(xml: &str) -> (Option<Root>, Vec<Message>) {
        let block = Block::new(Location::default(), xml.as_bytes().to_vec());
        let mut p = crate::Parser::new(&block);
        let (tx, rx) = channel();
        let h = MessageHandler::new(move |m| {
            tx.send(m).unwrap();
        });
        let root = decode_root::<Root>(&mut p, &h, "usage-root");
        h.stop();
        (root, rx.iter().collect())
    }

    #[test]
    fn test_decode_nested() {
        let xml = r#"<root id="r1"><first name="a">hello</first><item name="b"/><item name="c"/></root>"#;
        let (root, msgs) = decode(xml);
        assert!(msgs.is_empty(), "unexpected: {msgs:?}");
        let root = root.unwrap();
        assert_eq!(root.id.as_ref().unwrap().raw, "r1");
        let first = root.first.as_ref().unwrap();
        assert_eq!(first.name.as_ref().unwrap().raw, "a");
        assert_eq!(first.text.as_ref().unwrap().value, "hello");
        let names: Vec<_> = root
            .items
            .iter()
            .map(|i| i.name.as_ref().unwrap().raw.as_str())
            .collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_ranges_nest() {
        let xml = r#"<root><first name="a"/></root>"#;
        let (root, _) = decode(xml);
        let root = root.unwrap();
        let first = root.first.as_ref().unwrap();
        assert!(root.base.range.encloses(&first.base.range));
        let name = first.name.as_ref().unwrap();
        assert!(first.base.range.encloses(&name.base.range));
        assert_eq!(root.base.range.start.offset, 0);
        assert_eq!(root.base.range.end.offset, xml.len());
    }

    #[test]
    fn test_unknown_attribute_warns_and_continues() {
        let (root, msgs) = decode(r#"<root><first name="a" bogus="x"/></root>"#);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].severity, Severity::Warn);
        assert_eq!(msgs[0].key, ErrorKind::InvalidAttribute.key());
        // The element still decoded.
        assert_eq!(root.unwrap().first.unwrap().name.unwrap().raw, "a");
    }

    #[test]
    fn test_unknown_tag_is_skipped_with_warning() {
        let (root, msgs) =
            decode(r#"<root><mystery><deep/></mystery><first name="a"/></root>"#);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].severity, Severity::Warn);
        assert_eq!(msgs[0].key, ErrorKind::InvalidTag.key());
        assert!(root.unwrap().first.is_some());
    }

    #[test]
    fn test_required_member_missing() {
        let (root, msgs) = decode(r#"<root></root>"#);
        let required: Vec<_> = msgs
            .iter()
            .filter(|m| m.key == ErrorKind::Required.key())
            .collect();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].field, "first");
        assert_eq!(required[0].severity, Severity::Erro);
        assert!(root.is_some());
    }

    #[test]
    fn test_self_closing_with_required_children() {
        let (_, msgs) = decode(r#"<root/>"#);
        assert!(msgs.iter().any(|m| m.key == ErrorKind::Required.key()));
    }

    #[test]
    fn test_required_attribute_with_empty_value() {
        let (_, msgs) = decode(r#"<root><first name=""/></root>"#);
        let required: Vec<_> = msgs
            .iter()
            .filter(|m| m.key == ErrorKind::Required.key())
            .collect();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].field, "name");
    }

    #[test]
    fn test_mismatched_end_tag() {
        let (root, msgs) = decode(r#"<root><first name="a"></item></root>"#);
        assert!(root.is_none());
        assert!(msgs
            .iter()
            .any(|m| m.key == ErrorKind::NotFoundEndTag.key() && m.severity == Severity::Erro));
    }

    #[test]
    fn test_missing_end_tag_at_eof() {
        let (root, msgs) = decode(r#"<root><first name="a">"#);
        assert!(root.is_none());
        assert!(msgs.iter().any(|m| m.key == ErrorKind::NotFoundEndTag.key()));
    }

    #[test]
    fn test_two_roots_is_invalid() {
        let (root, msgs) = decode(r#"<root><first name="a"/></root><root/>"#);
        assert!(root.is_some());
        assert!(msgs.iter().any(|m| m.key == ErrorKind::InvalidXml.key()));
    }

    #[test]
    fn test_comments_and_instructions_ignored() {
        let (root, msgs) =
            decode("<?xml version=\"1.0\"?><!-- c --><root><first name=\"a\"/></root>");
        assert!(msgs.is_empty(), "unexpected: {msgs:?}");
        assert!(root.is_some());
    }

    #[test]
    fn test_encode_round_trip() {
        let xml = r#"<root id="r1"><first name="a">hello</first><item name="b"/></root>"#;
        let (root, _) = decode(xml);
        let root = root.unwrap();

        let mut w = XmlWriter::new();
        root.encode(&mut w, "root");
        let out = w.finish();

        let (again, msgs) = decode(&out);
        assert!(msgs.is_empty(), "unexpected: {msgs:?}");
        let again = again.unwrap();
        assert_eq!(again.id.as_ref().unwrap().raw, "r1");
        assert_eq!(
            again.first.as_ref().unwrap().text.as_ref().unwrap().value,
            "hello"
        );
        assert_eq!(again.items.len(), 1);
    }

    #[test]
    fn test_search_innermost_wins() {
        let xml = r#"<root id="r1"><first name="abc"/></root>"#;
        let (root, _) = decode(xml);
        let root = root.unwrap();

        // Inside the name attribute of <first>.
        let name_range = root.first.as_ref().unwrap().name.as_ref().unwrap().base.range;
        let tip = root.search_tip(name_range.start).unwrap();
        assert_eq!(tip.usage, "usage-leaf-name");

        // On the root's own start tag, outside any child.
        let tip = root.search_tip(Position::new(0, 1, 1)).unwrap();
        assert_eq!(tip.usage, "usage-root");

        // Outside the document.
        assert!(root.search_tip(Position::new(5, 0, 999)).is_none());
    }
}
