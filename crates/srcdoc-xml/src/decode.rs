//! The schema-driven decode driver
//!
//! One element at a time: read attributes, loop over child tokens,
//! check required members, then run the node's sanitize hook. The
//! per-node dispatch (which tag maps to which member) is generated by
//! [`xml_node!`](crate::xml_node); this module owns the state machine
//! those hooks plug into.
//!
//! Recovery policy: unknown tags and attributes and bad attribute
//! values are reported and skipped, and the element still enters the
//! tree. Truncated input and mismatched end tags unwind to the
//! enclosing element ([`Unwind`]).

use serde::Serialize;
use srcdoc_core::{ErrorKind, MessageHandler, Range, SyntaxError, Uri};

use crate::parser::Parser;
use crate::token::{Attribute, Name, SpannedString, StartElement, Token};

/// Marker for unrecoverable decode failures
///
/// The diagnostic has already been reported when this is returned;
/// callers only propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unwind;

/// Bookkeeping every decoded element carries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeBase {
    /// Range from the start tag's `<` to the end tag's `>`
    pub range: Range,

    /// The start tag name as written
    #[serde(skip)]
    pub start_tag: Name,

    /// The end tag name, absent for self-closing elements
    #[serde(skip)]
    pub end_tag: Option<Name>,

    /// Localization key describing this element's usage
    pub usage_key: &'static str,
}

/// Bookkeeping every decoded attribute carries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttrBase {
    /// Range of the whole `name="value"` pair
    pub range: Range,

    /// Range of just the value text
    pub value_range: Range,

    /// The attribute name as written
    #[serde(skip)]
    pub name: Name,

    /// Localization key describing this attribute's usage
    pub usage_key: &'static str,
}

/// A typed attribute that can parse itself from a value token
pub trait AttrDecoder: Default {
    /// Parse the value; errors are pinned to the token's range
    fn decode_attr(&mut self, uri: &Uri, attr: &Attribute) -> Result<(), SyntaxError>;

    /// The canonical string form for serialization
    fn encode_value(&self) -> String;

    /// Whether the parsed value counts as empty for required checks
    fn is_empty_value(&self) -> bool;

    /// The attribute's bookkeeping
    fn base_mut(&mut self) -> &mut AttrBase;
}

/// A member that receives `<![CDATA[…]]>` sections
pub trait CDataMember {
    /// Build the member from a CDATA token
    fn from_cdata(value: &SpannedString, usage: &'static str) -> Self;

    /// The text to serialize back into a CDATA section
    fn cdata_text(&self) -> &str;
}

/// A member that receives inter-tag text
pub trait ContentMember {
    /// Build the member from a text token
    fn from_text(value: &SpannedString, usage: &'static str) -> Self;

    /// The text to serialize back as element content
    fn content_text(&self) -> &str;
}

/// Decode hooks generated per node type by [`xml_node!`](crate::xml_node)
pub trait DecodeXml: Default {
    /// The element's own tag name when it appears as a document root
    fn tag_name() -> &'static str;

    /// The namespace the element belongs to; empty means default
    fn xml_namespace() -> &'static str {
        ""
    }

    /// Shared element bookkeeping
    fn node(&self) -> &NodeBase;

    /// Shared element bookkeeping, mutable
    fn node_mut(&mut self) -> &mut NodeBase;

    /// Decode one attribute into a member; false when unknown
    fn decode_attr(&mut self, d: &mut Decoder<'_, '_>, attr: &Attribute) -> bool;

    /// Decode one child element into a member; false when unknown
    fn decode_child(
        &mut self,
        d: &mut Decoder<'_, '_>,
        start: &StartElement,
    ) -> Result<bool, Unwind>;

    /// Accept a CDATA section; false when no member is declared
    fn decode_cdata(&mut self, _value: &SpannedString) -> bool {
        false
    }

    /// Accept text content; false when no member is declared
    fn decode_content(&mut self, _value: &SpannedString) -> bool {
        false
    }

    /// Report members lacking `omitempty` that are still empty
    fn check_required(&self, d: &mut Decoder<'_, '_>, range: Range);
}

/// Per-node cross-field validation, run after decoding
pub trait Sanitize {
    /// Validate; report through the decoder's handler
    fn sanitize(&mut self, _d: &mut Decoder<'_, '_>, _range: Range) {}
}

/// Shared state while decoding one block
pub struct Decoder<'p, 'a> {
    /// Token source
    pub parser: &'p mut Parser<'a>,

    /// Diagnostic sink
    pub handler: &'p MessageHandler,

    prefix: String,
}

impl<'p, 'a> Decoder<'p, 'a> {
    /// Create a decoder over a parser and a message handler
    pub fn new(parser: &'p mut Parser<'a>, handler: &'p MessageHandler) -> Self {
        Self {
            parser,
            handler,
            prefix: String::new(),
        }
    }

    /// The active namespace prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Report an `Erro` pinned to `range`
    pub fn error_at(&self, range: Range, field: &str, kind: ErrorKind) {
        self.handler
            .error(self.parser.new_error(range.start, range.end, field, kind));
    }

    /// Report a `Warn` pinned to `range`
    pub fn warn_at(&self, range: Range, field: &str, kind: ErrorKind) {
        self.handler
            .warn(self.parser.new_error(range.start, range.end, field, kind));
    }

    /// Report a missing required member
    pub fn required(&self, range: Range, field: &str) {
        self.error_at(range, field, ErrorKind::Required);
    }
}

/// Resolve the prefix declared for `namespace` on this element, if any
fn find_prefix(start: &StartElement, namespace: &str) -> Option<String> {
    if namespace.is_empty() {
        return None;
    }
    for attr in &start.attributes {
        if attr.value.value != namespace {
            continue;
        }
        if attr.name.prefix.value == "xmlns" {
            return Some(attr.name.local.value.clone());
        }
        if attr.name.prefix.value.is_empty() && attr.name.local.value == "xmlns" {
            return Some(String::new());
        }
    }
    None
}

fn is_xmlns(name: &Name) -> bool {
    name.prefix.value == "xmlns" || (name.prefix.value.is_empty() && name.local.value == "xmlns")
}

/// Decode the block's single root element into `T`
///
/// Comments, instructions and loose text around the root are ignored;
/// a second root element or a stray end tag / CDATA at document scope
/// is `InvalidXml`.
pub fn decode_root<T: DecodeXml + Sanitize>(
    p: &mut Parser<'_>,
    h: &MessageHandler,
    usage: &'static str,
) -> Option<T> {
    let mut d = Decoder::new(p, h);
    let mut root: Option<T> = None;
    loop {
        match d.parser.token() {
            Ok(None) => return root,
            Err(e) => {
                d.handler.error(e);
                return root;
            }
            Ok(Some(Token::Start(start))) => {
                if root.is_some() {
                    d.error_at(start.range, "", ErrorKind::InvalidXml);
                    return root;
                }
                d.prefix = find_prefix(&start, T::xml_namespace()).unwrap_or_default();
                match decode_element::<T>(&mut d, &start, usage) {
                    Ok(node) => root = Some(node),
                    Err(Unwind) => return None,
                }
            }
            Ok(Some(Token::Comment(_) | Token::Text(_) | Token::Instruction(_))) => {}
            Ok(Some(t)) => {
                d.error_at(t.range(), "", ErrorKind::InvalidXml);
                return root;
            }
        }
    }
}

/// Decode one element whose start tag has already been read
pub fn decode_element<T: DecodeXml + Sanitize>(
    d: &mut Decoder<'_, '_>,
    start: &StartElement,
    usage: &'static str,
) -> Result<T, Unwind> {
    let saved = match find_prefix(start, T::xml_namespace()) {
        Some(p) => Some(std::mem::replace(&mut d.prefix, p)),
        None => None,
    };
    let result = decode_element_inner::<T>(d, start, usage);
    if let Some(p) = saved {
        d.prefix = p;
    }
    result
}

fn decode_element_inner<T: DecodeXml + Sanitize>(
    d: &mut Decoder<'_, '_>,
    start: &StartElement,
    usage: &'static str,
) -> Result<T, Unwind> {
    let mut node = T::default();

    for attr in &start.attributes {
        if is_xmlns(&attr.name) {
            continue;
        }
        if attr.name.prefix.value != d.prefix {
            continue;
        }
        if !node.decode_attr(d, attr) {
            d.warn_at(
                attr.name.range,
                &attr.name.to_string(),
                ErrorKind::InvalidAttribute,
            );
        }
    }

    let mut end_range = start.range;
    if !start.self_closing {
        loop {
            let token = match d.parser.token() {
                Ok(Some(t)) => t,
                Ok(None) => {
                    d.error_at(start.range, &start.name.to_string(), ErrorKind::NotFoundEndTag);
                    return Err(Unwind);
                }
                Err(e) => {
                    d.handler.error(e);
                    return Err(Unwind);
                }
            };
            match token {
                Token::End(end) => {
                    if end.name.local.value == start.name.local.value
                        && end.name.prefix.value == d.prefix
                    {
                        node.node_mut().end_tag = Some(end.name.clone());
                        end_range = end.range;
                        break;
                    }
                    d.error_at(end.range, &start.name.to_string(), ErrorKind::NotFoundEndTag);
                    return Err(Unwind);
                }
                Token::Start(child) => {
                    let known = if child.name.prefix.value == d.prefix {
                        node.decode_child(d, &child)?
                    } else {
                        false
                    };
                    if !known {
                        skip_element(d, &child)?;
                        d.warn_at(
                            child.name.range,
                            &child.name.to_string(),
                            ErrorKind::InvalidTag,
                        );
                    }
                }
                Token::CData(c) => {
                    if !node.decode_cdata(&c) {
                        d.error_at(c.range, "", ErrorKind::InvalidXml);
                    }
                }
                Token::Text(t) => {
                    if !node.decode_content(&t) && !t.value.trim().is_empty() {
                        d.error_at(t.range, "", ErrorKind::InvalidXml);
                    }
                }
                Token::Comment(_) | Token::Instruction(_) => {}
            }
        }
    }

    let range = Range::new(start.range.start, end_range.end);
    {
        let base = node.node_mut();
        base.range = range;
        base.start_tag = start.name.clone();
        base.usage_key = usage;
    }

    node.check_required(d, range);
    node.sanitize(d, range);
    Ok(node)
}

/// Skip an unknown element, nesting included
pub fn skip_element(d: &mut Decoder<'_, '_>, start: &StartElement) -> Result<(), Unwind> {
    if start.self_closing {
        return Ok(());
    }
    let mut depth = 0usize;
    loop {
        match d.parser.token() {
            Ok(Some(Token::Start(s))) => {
                if !s.self_closing && s.name.matches(&start.name) {
                    depth += 1;
                }
            }
            Ok(Some(Token::End(e))) => {
                if e.name.matches(&start.name) {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                d.error_at(start.range, &start.name.to_string(), ErrorKind::NotFoundEndTag);
                return Err(Unwind);
            }
            Err(e) => {
                d.handler.error(e);
                return Err(Unwind);
            }
        }
    }
}

/// Decode a typed attribute into its slot
///
/// Parse failures are reported but the attribute still lands in the
/// tree with its ranges set, so position lookups keep working and the
/// required check does not fire a second diagnostic.
pub fn decode_attr_into<A: AttrDecoder>(
    slot: &mut Option<A>,
    d: &mut Decoder<'_, '_>,
    attr: &Attribute,
    usage: &'static str,
) {
    let mut value = A::default();
    let uri = d.parser.uri().clone();
    if let Err(e) = value.decode_attr(&uri, attr) {
        d.handler.error(e);
    }
    let base = value.base_mut();
    base.range = attr.range;
    base.value_range = attr.value.range;
    base.name = attr.name.clone();
    base.usage_key = usage;
    *slot = Some(value);
}
