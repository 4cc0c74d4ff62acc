//! The document schema
//!
//! One `xml_node!` declaration per element type; the macro derives the
//! decode hooks, the position-lookup descent and the XML encoder from
//! it. Member order here is serialization order.

use serde::Serialize;
use srcdoc_core::{Range, Uri};
use srcdoc_xml::{
    needs_cdata, xml_node, CDataMember, ContentMember, EncodeXml, Position, Search, SpannedString,
    Tip, XmlWriter,
};

use crate::attr::{
    BoolAttribute, DateAttribute, DocVersionAttribute, MethodAttribute, StatusAttribute,
    StringAttribute, TypeAttribute, VersionAttribute,
};

/// Verbatim CDATA content with its source range
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CDataValue {
    /// The text between `<![CDATA[` and `]]>`
    pub value: String,

    /// Range of the whole section
    pub range: Range,

    /// Usage localization key
    pub usage_key: &'static str,
}

impl CDataMember for CDataValue {
    fn from_cdata(value: &SpannedString, usage: &'static str) -> Self {
        Self {
            value: value.value.clone(),
            range: value.range,
            usage_key: usage,
        }
    }

    fn cdata_text(&self) -> &str {
        &self.value
    }
}

impl Search for CDataValue {
    fn search_tip(&self, pos: Position) -> Option<Tip> {
        if self.usage_key.is_empty() || !self.range.contains(pos) {
            return None;
        }
        Some(Tip {
            range: self.range,
            usage: self.usage_key,
        })
    }
}

/// Example code: CDATA with the common leading indent stripped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExampleValue {
    /// The dedented example text
    pub value: String,

    /// Range of the whole section
    pub range: Range,

    /// Usage localization key
    pub usage_key: &'static str,
}

/// Strip the minimum common indent of all non-blank lines
fn strip_common_indent(s: &str) -> String {
    let indent_of = |line: &str| line.len() - line.trim_start().len();
    let min = s
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(indent_of)
        .min()
        .unwrap_or(0);
    if min == 0 {
        return s.to_string();
    }
    s.lines()
        .map(|l| if indent_of(l) >= min { &l[min..] } else { l.trim_start() })
        .collect::<Vec<_>>()
        .join("\n")
}

impl CDataMember for ExampleValue {
    fn from_cdata(value: &SpannedString, usage: &'static str) -> Self {
        Self {
            value: strip_common_indent(&value.value),
            range: value.range,
            usage_key: usage,
        }
    }

    fn cdata_text(&self) -> &str {
        &self.value
    }
}

impl Search for ExampleValue {
    fn search_tip(&self, pos: Position) -> Option<Tip> {
        if self.usage_key.is_empty() || !self.range.contains(pos) {
            return None;
        }
        Some(Tip {
            range: self.range,
            usage: self.usage_key,
        })
    }
}

/// Plain element text content
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentValue {
    /// The trimmed text
    pub value: String,

    /// Range of the raw text run
    pub range: Range,

    /// Usage localization key
    pub usage_key: &'static str,
}

impl ContentMember for ContentValue {
    fn from_text(value: &SpannedString, usage: &'static str) -> Self {
        Self {
            value: value.value.trim().to_string(),
            range: value.range,
            usage_key: usage,
        }
    }

    fn content_text(&self) -> &str {
        &self.value
    }
}

impl Search for ContentValue {
    fn search_tip(&self, _pos: Position) -> Option<Tip> {
        None
    }
}

xml_node! {
    /// The `<apidoc>` root element: document metadata plus the APIs.
    pub struct ApiDoc {
        tag = "apidoc", usage = "usage-apidoc";
        /// Format version this document was produced with; output only.
        attr apidoc: DocVersionAttribute => ("apidoc", "usage-apidoc-apidoc", omitempty);
        /// Locale hint for rendered output.
        attr lang: StringAttribute => ("lang", "usage-apidoc-lang", omitempty);
        /// Logo URL for rendered output.
        attr logo: StringAttribute => ("logo", "usage-apidoc-logo", omitempty);
        attr created: DateAttribute => ("created", "usage-apidoc-created", omitempty);
        attr version: VersionAttribute => ("version", "usage-apidoc-version", omitempty);
        elem title: Element => ("title", "usage-apidoc-title", required);
        elem description: Richtext => ("description", "usage-apidoc-description", omitempty);
        elem contact: Contact => ("contact", "usage-apidoc-contact", omitempty);
        elem license: Link => ("license", "usage-apidoc-license", omitempty);
        list tags: Tag => ("tag", "usage-apidoc-tags", omitempty);
        list servers: Server => ("server", "usage-apidoc-servers", omitempty);
        list apis: Api => ("api", "usage-apidoc-apis", omitempty);
        /// Headers every API implicitly accepts.
        list headers: Param => ("header", "usage-apidoc-headers", omitempty);
        /// Responses every API may produce.
        list responses: Request => ("response", "usage-apidoc-responses", omitempty);
        /// Mimetypes all APIs support.
        list mimetypes: Element => ("mimetype", "usage-apidoc-mimetypes", required);
        list xml_namespaces: XmlNamespace => ("xml-namespace", "usage-apidoc-xml-namespaces", omitempty);
        extra uri: Uri => ();
    }
}

xml_node! {
    /// An `<xml-namespace>` declaration.
    pub struct XmlNamespace {
        tag = "xml-namespace", usage = "usage-xml-namespace";
        attr prefix: StringAttribute => ("prefix", "usage-xml-namespace-prefix", omitempty);
        attr urn: StringAttribute => ("urn", "usage-xml-namespace-urn", required);
    }
}

xml_node! {
    /// An `<api>` element describing one endpoint.
    pub struct Api {
        tag = "api", usage = "usage-api";
        attr version: VersionAttribute => ("version", "usage-api-version", omitempty);
        attr method: MethodAttribute => ("method", "usage-api-method", required);
        attr id: StringAttribute => ("id", "usage-api-id", omitempty);
        attr summary: StringAttribute => ("summary", "usage-api-summary", omitempty);
        attr deprecated: VersionAttribute => ("deprecated", "usage-api-deprecated", omitempty);
        elem path: Path => ("path", "usage-api-path", required);
        elem description: Richtext => ("description", "usage-api-description", omitempty);
        /// Request bodies; one per mimetype.
        list requests: Request => ("request", "usage-api-requests", omitempty);
        list responses: Request => ("response", "usage-api-responses", omitempty);
        elem callback: Callback => ("callback", "usage-api-callback", omitempty);
        list headers: Param => ("header", "usage-api-headers", omitempty);
        list tags: Element => ("tag", "usage-api-tags", omitempty);
        list servers: Element => ("server", "usage-api-servers", omitempty);
        /// The file the API was declared in; empty means the root document's file.
        extra uri: Uri => ();
    }
}

xml_node! {
    /// A `<path>` element: the route and its parameters.
    pub struct Path {
        tag = "path", usage = "usage-path";
        attr path: StringAttribute => ("path", "usage-path-path", required);
        list params: Param => ("param", "usage-path-params", omitempty);
        list queries: Param => ("query", "usage-path-queries", omitempty);
    }
}

xml_node! {
    /// A `<param>` element; also used for headers and queries.
    pub struct Param {
        tag = "param", usage = "usage-param";
        /// Serialize as an XML attribute of the parent.
        attr xml_attr: BoolAttribute => ("xml-attr", "usage-xml-attr", omitempty);
        /// Lift this value into the parent's content.
        attr xml_extract: BoolAttribute => ("xml-extract", "usage-xml-extract", omitempty);
        /// Emit the value as CDATA.
        attr xml_cdata: BoolAttribute => ("xml-cdata", "usage-xml-cdata", omitempty);
        attr xml_ns_prefix: StringAttribute => ("xml-ns-prefix", "usage-xml-ns-prefix", omitempty);
        /// Wrapper element name for arrays.
        attr xml_wrapped: StringAttribute => ("xml-wrapped", "usage-xml-wrapped", omitempty);
        attr name: StringAttribute => ("name", "usage-param-name", required);
        attr ptype: TypeAttribute => ("type", "usage-param-type", required);
        attr deprecated: VersionAttribute => ("deprecated", "usage-param-deprecated", omitempty);
        attr default: StringAttribute => ("default", "usage-param-default", omitempty);
        attr optional: BoolAttribute => ("optional", "usage-param-optional", omitempty);
        attr array: BoolAttribute => ("array", "usage-param-array", omitempty);
        /// Render array values comma-joined instead of repeated keys.
        attr array_style: BoolAttribute => ("array-style", "usage-param-array-style", omitempty);
        attr summary: StringAttribute => ("summary", "usage-param-summary", omitempty);
        list items: Param => ("param", "usage-param-items", omitempty);
        list enums: Enum => ("enum", "usage-param-enums", omitempty);
        elem description: Richtext => ("description", "usage-param-description", omitempty);
    }
}

xml_node! {
    /// A `<request>` or `<response>` body description.
    pub struct Request {
        tag = "request", usage = "usage-request";
        attr xml_attr: BoolAttribute => ("xml-attr", "usage-xml-attr", omitempty);
        attr xml_extract: BoolAttribute => ("xml-extract", "usage-xml-extract", omitempty);
        attr xml_cdata: BoolAttribute => ("xml-cdata", "usage-xml-cdata", omitempty);
        attr xml_ns_prefix: StringAttribute => ("xml-ns-prefix", "usage-xml-ns-prefix", omitempty);
        attr xml_wrapped: StringAttribute => ("xml-wrapped", "usage-xml-wrapped", omitempty);
        /// Top-level element name when describing an XML body.
        attr name: StringAttribute => ("name", "usage-request-name", omitempty);
        attr rtype: TypeAttribute => ("type", "usage-request-type", omitempty);
        attr deprecated: VersionAttribute => ("deprecated", "usage-request-deprecated", omitempty);
        attr array: BoolAttribute => ("array", "usage-request-array", omitempty);
        attr summary: StringAttribute => ("summary", "usage-request-summary", omitempty);
        attr status: StatusAttribute => ("status", "usage-request-status", omitempty);
        attr mimetype: StringAttribute => ("mimetype", "usage-request-mimetype", omitempty);
        list items: Param => ("param", "usage-request-items", omitempty);
        list enums: Enum => ("enum", "usage-request-enums", omitempty);
        list examples: Example => ("example", "usage-request-examples", omitempty);
        list headers: Param => ("header", "usage-request-headers", omitempty);
        elem description: Richtext => ("description", "usage-request-description", omitempty);
    }
}

xml_node! {
    /// A `<callback>` an API may invoke on the client.
    pub struct Callback {
        tag = "callback", usage = "usage-callback";
        attr method: MethodAttribute => ("method", "usage-callback-method", required);
        attr summary: StringAttribute => ("summary", "usage-callback-summary", omitempty);
        attr deprecated: VersionAttribute => ("deprecated", "usage-callback-deprecated", omitempty);
        elem path: Path => ("path", "usage-callback-path", omitempty);
        elem description: Richtext => ("description", "usage-callback-description", omitempty);
        list responses: Request => ("response", "usage-callback-responses", omitempty);
        list requests: Request => ("request", "usage-callback-requests", required);
        list headers: Param => ("header", "usage-callback-headers", omitempty);
    }
}

xml_node! {
    /// An `<enum>` value of a parameter.
    pub struct Enum {
        tag = "enum", usage = "usage-enum";
        attr deprecated: VersionAttribute => ("deprecated", "usage-enum-deprecated", omitempty);
        attr value: StringAttribute => ("value", "usage-enum-value", required);
        attr summary: StringAttribute => ("summary", "usage-enum-summary", omitempty);
        elem description: Richtext => ("description", "usage-enum-description", omitempty);
    }
}

xml_node! {
    /// An `<example>` body.
    pub struct Example {
        tag = "example", usage = "usage-example";
        attr mimetype: StringAttribute => ("mimetype", "usage-example-mimetype", required);
        attr summary: StringAttribute => ("summary", "usage-example-summary", omitempty);
        cdata content: ExampleValue => ("usage-example-content", omitempty);
    }
}

xml_node! {
    /// Rich text: HTML or markdown, usually wrapped in CDATA.
    pub struct Richtext {
        tag = "richtext", usage = "usage-richtext", encode = manual;
        attr rtype: StringAttribute => ("type", "usage-richtext-type", omitempty);
        cdata text: CDataValue => ("usage-richtext-text", omitempty);
        content fallback: ContentValue => ("usage-richtext-text", omitempty);
    }
}

impl EncodeXml for Richtext {
    /// The body goes out as CDATA iff it contains markup-significant
    /// characters, regardless of how it was written in the source.
    fn encode(&self, w: &mut XmlWriter, tag: &str) {
        w.open(tag);
        if let Some(t) = &self.rtype {
            if !t.raw.is_empty() {
                w.attr("type", &t.raw);
            }
        }
        let body = self.text();
        if !body.is_empty() {
            if needs_cdata(body) {
                w.cdata(body);
            } else {
                w.text(body);
            }
        }
        w.close(tag);
    }
}

xml_node! {
    /// A `<link>`: display text plus URL.
    pub struct Link {
        tag = "link", usage = "usage-link";
        attr text: StringAttribute => ("text", "usage-link-text", required);
        attr url: StringAttribute => ("url", "usage-link-url", required);
    }
}

xml_node! {
    /// A `<contact>` for the documented service.
    pub struct Contact {
        tag = "contact", usage = "usage-contact";
        attr name: StringAttribute => ("name", "usage-contact-name", required);
        elem url: Element => ("url", "usage-contact-url", omitempty);
        elem email: Element => ("email", "usage-contact-email", omitempty);
    }
}

xml_node! {
    /// A `<tag>` APIs can be grouped under.
    pub struct Tag {
        tag = "tag", usage = "usage-tag";
        /// Unique id other elements reference.
        attr name: StringAttribute => ("name", "usage-tag-name", required);
        /// Display title.
        attr title: StringAttribute => ("title", "usage-tag-title", required);
        attr deprecated: VersionAttribute => ("deprecated", "usage-tag-deprecated", omitempty);
    }
}

xml_node! {
    /// A `<server>` APIs are reachable on.
    pub struct Server {
        tag = "server", usage = "usage-server";
        /// Unique name other elements reference.
        attr name: StringAttribute => ("name", "usage-server-name", required);
        attr url: StringAttribute => ("url", "usage-server-url", required);
        attr deprecated: VersionAttribute => ("deprecated", "usage-server-deprecated", omitempty);
        attr summary: StringAttribute => ("summary", "usage-server-summary", omitempty);
        elem description: Richtext => ("description", "usage-server-description", omitempty);
    }
}

xml_node! {
    /// A basic element holding only text, such as `<title>` or `<mimetype>`.
    pub struct Element {
        tag = "string", usage = "usage-string";
        content value: ContentValue => ("usage-string", omitempty);
    }
}

impl Element {
    /// The element's text, empty when none was given
    pub fn text(&self) -> &str {
        self.value.as_ref().map_or("", |v| v.value.as_str())
    }
}

impl Richtext {
    /// The body text, preferring the CDATA section
    pub fn text(&self) -> &str {
        if let Some(c) = &self.text {
            return &c.value;
        }
        self.fallback.as_ref().map_or("", |v| v.value.as_str())
    }

    /// The richtext type, defaulting to markdown
    pub fn doc_type(&self) -> &str {
        self.rtype.as_ref().map_or("markdown", |t| {
            if t.raw.is_empty() {
                "markdown"
            } else {
                t.raw.as_str()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_common_indent() {
        let s = "    {\n      \"a\": 1\n    }";
        assert_eq!(strip_common_indent(s), "{\n  \"a\": 1\n}");
        assert_eq!(strip_common_indent("no indent"), "no indent");
        assert_eq!(strip_common_indent(""), "");
    }

    #[test]
    fn test_strip_common_indent_ignores_blank_lines() {
        let s = "  a\n\n  b";
        assert_eq!(strip_common_indent(s), "a\n\nb");
    }

    #[test]
    fn test_element_text_default() {
        let e = Element::default();
        assert_eq!(e.text(), "");
    }

    #[test]
    fn test_richtext_defaults_to_markdown() {
        let r = Richtext::default();
        assert_eq!(r.doc_type(), "markdown");
        assert_eq!(r.text(), "");
    }
}
