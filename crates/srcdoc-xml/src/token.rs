//! Positional XML tokens
//!
//! Every token carries the range it was read from, and names keep the
//! ranges of their prefix and local parts separately, so diagnostics
//! and editor lookups can point at the exact characters involved.

use std::fmt;

use serde::Serialize;
use srcdoc_core::Range;

/// A string together with the range it came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SpannedString {
    /// The (entity-expanded) text
    pub value: String,

    /// Where the raw text sits in the source
    pub range: Range,
}

impl SpannedString {
    /// Create a spanned string
    pub fn new(value: impl Into<String>, range: Range) -> Self {
        Self {
            value: value.into(),
            range,
        }
    }
}

/// A qualified name: optional `prefix:` plus local part
///
/// An empty prefix denotes the default namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Name {
    /// Namespace prefix, empty for the default namespace
    pub prefix: SpannedString,

    /// Local part of the name
    pub local: SpannedString,

    /// Range of the whole name
    pub range: Range,
}

impl Name {
    /// Compare prefix and local values
    pub fn matches(&self, other: &Name) -> bool {
        self.prefix.value == other.prefix.value && self.local.value == other.local.value
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.value.is_empty() {
            f.write_str(&self.local.value)
        } else {
            write!(f, "{}:{}", self.prefix.value, self.local.value)
        }
    }
}

/// One `name="value"` pair inside a start tag or instruction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Attribute {
    /// The attribute name
    pub name: Name,

    /// The attribute value, entities expanded; its range covers the
    /// text between the quotes
    pub value: SpannedString,

    /// Range of the whole `name="value"` pair
    pub range: Range,
}

/// A start tag, attributes included
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StartElement {
    /// The tag name
    pub name: Name,

    /// Attributes in source order
    pub attributes: Vec<Attribute>,

    /// True for `<x/>`; no matching end element will follow
    pub self_closing: bool,

    /// Range of the whole tag
    pub range: Range,
}

/// An end tag
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndElement {
    /// The tag name
    pub name: Name,

    /// Range of the whole tag
    pub range: Range,
}

/// A processing instruction such as `<?xml version="1.0"?>`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instruction {
    /// Instruction target name
    pub name: SpannedString,

    /// Pseudo-attributes in source order
    pub attributes: Vec<Attribute>,

    /// Range of the whole instruction
    pub range: Range,
}

/// A token produced by the XML parser
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A start tag
    Start(StartElement),
    /// An end tag
    End(EndElement),
    /// A `<![CDATA[…]]>` section; value is verbatim
    CData(SpannedString),
    /// Inter-tag text, predefined entities expanded
    Text(SpannedString),
    /// A `<!-- … -->` comment; ignored by the decoder
    Comment(SpannedString),
    /// A processing instruction; ignored by the decoder
    Instruction(Instruction),
}

impl Token {
    /// The source range of the token
    pub fn range(&self) -> Range {
        match self {
            Token::Start(t) => t.range,
            Token::End(t) => t.range,
            Token::CData(t) => t.range,
            Token::Text(t) => t.range,
            Token::Comment(t) => t.range,
            Token::Instruction(t) => t.range,
        }
    }
}
