//! srcdoc-ast - The merged documentation tree
//!
//! Strongly-typed nodes for the `apidoc` schema, typed attributes with
//! source ranges, per-node sanitize hooks, and the [`ApiDoc`] root that
//! merges blocks from many files, serializes back to XML, and answers
//! editor position lookups.

pub mod apidoc;
pub mod attr;
pub mod elements;
pub mod sanitize;
pub mod serialize;

pub use apidoc::block_from;
pub use attr::{
    Attr, AttrValue, BoolAttribute, DateAttribute, DocVersionAttribute, MethodAttribute,
    StatusAttribute, StringAttribute, TypeAttribute, TypeValue, VersionAttribute, METHODS,
};
pub use elements::{
    Api, ApiDoc, CDataValue, Callback, Contact, ContentValue, Element, Enum, Example,
    ExampleValue, Link, Param, Path, Request, Richtext, Server, Tag, XmlNamespace,
};

#[cfg(test)]
mod tests {
    use super::*;
    use srcdoc_core::{ErrorKind, Message, MessageHandler, Position, Severity, Uri};
    use std::sync::mpsc::channel;

    fn parse(doc: &mut ApiDoc, uri: &str, xml: &str) -> Vec<Message> {
        let (tx, rx) = channel();
        let h = MessageHandler::new(move |m| {
            tx.send(m).unwrap();
        });
        doc.parse(&h, &block_from(Uri::new(uri), xml.as_bytes().to_vec()));
        h.stop();
        rx.iter().collect()
    }

    fn errors(msgs: &[Message]) -> Vec<&Message> {
        msgs.iter().filter(|m| m.severity == Severity::Erro).collect()
    }

    const DOC: &str = concat!(
        r#"<apidoc version="1.0.0">"#,
        r#"<title>T</title>"#,
        r#"<mimetype>application/json</mimetype>"#,
        r#"</apidoc>"#
    );

    #[test]
    fn test_apidoc_root_block() {
        let mut doc = ApiDoc::default();
        let msgs = parse(&mut doc, "a.go", DOC);
        assert!(errors(&msgs).is_empty(), "unexpected: {msgs:?}");

        assert_eq!(doc.title.as_ref().unwrap().text(), "T");
        assert_eq!(doc.mimetypes.len(), 1);
        assert_eq!(doc.mimetypes[0].text(), "application/json");
        assert_eq!(doc.uri.as_str(), "a.go");

        // The version attribute's value range pins the "1.0.0" text.
        let version = doc.version.as_ref().unwrap();
        let r = version.base.value_range;
        assert_eq!(&DOC[r.start.offset..r.end.offset], "1.0.0");
    }

    #[test]
    fn test_non_documentation_blocks_are_skipped() {
        let mut doc = ApiDoc::default();
        for text in [
            "just a prose comment",
            "a < b in a formula",
            "<ul><li>markdown-ish</li></ul>",
            "",
        ] {
            let msgs = parse(&mut doc, "a.go", text);
            assert!(msgs.is_empty(), "{text:?} produced {msgs:?}");
            assert!(doc.is_empty());
        }
    }

    #[test]
    fn test_duplicate_apidoc_root() {
        let mut doc = ApiDoc::default();
        parse(&mut doc, "a.go", DOC);
        let msgs = parse(&mut doc, "b.go", DOC);
        let errs = errors(&msgs);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].key, ErrorKind::DuplicateValue.key());
        assert_eq!(errs[0].field, "apidoc");
    }

    #[test]
    fn test_api_block_accumulates() {
        let mut doc = ApiDoc::default();
        parse(&mut doc, "a.go", DOC);
        let msgs = parse(
            &mut doc,
            "b.go",
            r#"<api method="GET"><path path="/x"/></api>"#,
        );
        assert!(errors(&msgs).is_empty(), "unexpected: {msgs:?}");
        assert_eq!(doc.apis.len(), 1);
        assert_eq!(doc.apis[0].uri.as_str(), "b.go");
        assert_eq!(doc.apis[0].method.as_ref().unwrap().method(), "GET");
    }

    #[test]
    fn test_path_param_mismatch() {
        let mut doc = ApiDoc::default();
        let xml = r#"<api method="GET"><path path="/u/{id}"><param name="uid" type="string"/></path></api>"#;
        let msgs = parse(&mut doc, "a.go", xml);
        let invalid: Vec<_> = msgs
            .iter()
            .filter(|m| m.key == ErrorKind::InvalidValue.key())
            .collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].field, "path");
        let r = invalid[0].location.range;
        assert_eq!(&xml[r.start.offset..r.end.offset], "/u/{id}");
    }

    #[test]
    fn test_duplicate_method_path_across_files() {
        let mut doc = ApiDoc::default();
        let api = r#"<api method="GET"><path path="/x"/></api>"#;
        let msgs = parse(&mut doc, "a.go", api);
        assert!(errors(&msgs).is_empty());

        let msgs = parse(&mut doc, "b.go", api);
        let dups: Vec<_> = msgs
            .iter()
            .filter(|m| m.key == ErrorKind::DuplicateValue.key())
            .collect();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].field, "method");
        assert_eq!(dups[0].location.uri.as_str(), "b.go");
        // Both APIs stay in the tree for position lookups.
        assert_eq!(doc.apis.len(), 2);
    }

    #[test]
    fn test_duplicate_api_id() {
        let mut doc = ApiDoc::default();
        parse(
            &mut doc,
            "a.go",
            r#"<api method="GET" id="x"><path path="/a"/></api>"#,
        );
        let msgs = parse(
            &mut doc,
            "b.go",
            r#"<api method="POST" id="x"><path path="/b"/></api>"#,
        );
        let dups: Vec<_> = msgs
            .iter()
            .filter(|m| m.key == ErrorKind::DuplicateValue.key())
            .collect();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].field, "id");
    }

    #[test]
    fn test_object_param_without_children() {
        let mut doc = ApiDoc::default();
        let msgs = parse(
            &mut doc,
            "a.go",
            r#"<api method="GET"><path path="/x"><query name="q" type="object"/></path></api>"#,
        );
        let required: Vec<_> = msgs
            .iter()
            .filter(|m| m.key == ErrorKind::Required.key())
            .collect();
        assert_eq!(required.len(), 1);
        assert_eq!(required[0].field, "param");
    }

    #[test]
    fn test_duplicate_enum_values() {
        let mut doc = ApiDoc::default();
        let xml = r#"<api method="GET"><path path="/x"><query name="s" type="string"><enum value="a"/><enum value="a"/></query></path></api>"#;
        let msgs = parse(&mut doc, "a.go", xml);
        let dups: Vec<_> = msgs
            .iter()
            .filter(|m| m.key == ErrorKind::DuplicateValue.key())
            .collect();
        assert_eq!(dups.len(), 1);
        // Pinned to the second occurrence.
        let r = dups[0].location.range;
        assert_eq!(r.start.offset, xml.rfind("enum value=\"a\"").unwrap() + 12);
    }

    #[test]
    fn test_delete_uri_removes_apis() {
        let mut doc = ApiDoc::default();
        parse(&mut doc, "a.go", DOC);
        parse(&mut doc, "b.go", r#"<api method="GET"><path path="/x"/></api>"#);
        parse(&mut doc, "c.go", r#"<api method="GET"><path path="/y"/></api>"#);
        assert_eq!(doc.apis.len(), 2);

        doc.delete_uri(&Uri::new("b.go"));
        assert_eq!(doc.apis.len(), 1);
        assert_eq!(doc.apis[0].uri.as_str(), "c.go");
        assert!(doc.title.is_some());

        // Retracting the metadata owner clears it but keeps the APIs.
        doc.delete_uri(&Uri::new("a.go"));
        assert!(doc.title.is_none());
        assert_eq!(doc.apis.len(), 1);
    }

    #[test]
    fn test_search_finds_innermost() {
        let mut doc = ApiDoc::default();
        let xml = r#"<api method="GET" summary="s"><path path="/x"/></api>"#;
        parse(&mut doc, "a.go", xml);

        // Inside the method attribute.
        let at = xml.find("GET").unwrap();
        let tip = doc
            .search(&Uri::new("a.go"), Position::new(0, at, at))
            .unwrap();
        assert_eq!(tip.usage, "usage-api-method");

        // Inside the path element but outside its attributes.
        let at = xml.find("<path").unwrap() + 1;
        let tip = doc
            .search(&Uri::new("a.go"), Position::new(0, at, at))
            .unwrap();
        assert_eq!(tip.usage, "usage-api-path");

        // A different file finds nothing.
        assert!(doc.search(&Uri::new("z.go"), Position::new(0, at, at)).is_none());
    }

    #[test]
    fn test_round_trip() {
        let mut doc = ApiDoc::default();
        parse(
            &mut doc,
            "a.go",
            concat!(
                r#"<apidoc version="2.1.0" lang="en">"#,
                r#"<title>Sample</title>"#,
                r#"<description type="markdown"><![CDATA[Some *docs* here]]></description>"#,
                r#"<tag name="users" title="Users"/>"#,
                r#"<server name="prod" url="https://api.example.com"/>"#,
                r#"<mimetype>application/json</mimetype>"#,
                r#"</apidoc>"#
            ),
        );
        parse(
            &mut doc,
            "b.go",
            concat!(
                r#"<api method="GET" summary="list users">"#,
                r#"<path path="/users/{id}"><param name="id" type="number"/></path>"#,
                r#"<response status="200" type="object" mimetype="application/json">"#,
                r#"<param name="name" type="string"/>"#,
                r#"</response>"#,
                r#"</api>"#
            ),
        );

        let xml = doc.to_xml(None);
        assert!(xml.starts_with("<?xml"));

        let mut again = ApiDoc::default();
        let msgs = parse(&mut again, "out.xml", &xml);
        assert!(errors(&msgs).is_empty(), "re-parse errors: {msgs:?}\n{xml}");

        assert_eq!(again.title.as_ref().unwrap().text(), "Sample");
        assert_eq!(again.description.as_ref().unwrap().text(), "Some *docs* here");
        assert_eq!(again.tags.len(), 1);
        assert_eq!(again.servers.len(), 1);
        assert_eq!(again.apis.len(), doc.apis.len());
        let api = &again.apis[0];
        assert_eq!(api.method.as_ref().unwrap().method(), "GET");
        assert_eq!(
            api.path.as_ref().unwrap().path.as_ref().unwrap().raw(),
            "/users/{id}"
        );
        assert_eq!(api.responses[0].status.as_ref().unwrap().value.0, 200);
    }

    #[test]
    fn test_richtext_body_cdata_follows_content() {
        // A markup-significant body written as escaped text still
        // serializes as CDATA.
        let mut doc = ApiDoc::default();
        parse(
            &mut doc,
            "a.go",
            r#"<apidoc><title>T</title><description>a &amp; b</description><mimetype>m</mimetype></apidoc>"#,
        );
        let xml = doc.to_xml(None);
        assert!(
            xml.contains("<description><![CDATA[a & b]]></description>"),
            "{xml}"
        );

        // A plain body written as CDATA serializes as ordinary text.
        let mut doc = ApiDoc::default();
        parse(
            &mut doc,
            "a.go",
            r#"<apidoc><title>T</title><description><![CDATA[plain words]]></description><mimetype>m</mimetype></apidoc>"#,
        );
        let xml = doc.to_xml(None);
        assert!(
            xml.contains("<description>plain words</description>"),
            "{xml}"
        );
    }

    #[test]
    fn test_rslt_serialization() {
        let mut doc = ApiDoc::default();
        parse(&mut doc, "a.go", DOC);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"apis\""));
        assert!(json.contains("application/json"));
    }
}
