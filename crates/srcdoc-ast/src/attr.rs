//! Typed attributes
//!
//! Every schema attribute is an [`Attr<V>`]: the parsed value, the raw
//! text as written, and the ranges of the whole pair and of the value.
//! Parsing distinguishes `InvalidFormat` (does not parse) from
//! `InvalidValue` (parses but outside the allowed domain). The raw
//! text is what serialization writes back, so documents round-trip as
//! written.

use chrono::{DateTime, FixedOffset};
use semver::Version;
use serde::Serialize;
use srcdoc_core::{version, ErrorKind, Position, SyntaxError, Uri};
use srcdoc_xml::{AttrBase, AttrDecoder, Attribute, Search, Tip};

/// HTTP methods accepted by `method` attributes (RFC 7231 set + PATCH)
pub const METHODS: &[&str] = &[
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE",
];

/// Build a syntax error pinned to an attribute's value
fn attr_error(uri: &Uri, attr: &Attribute, kind: ErrorKind) -> SyntaxError {
    SyntaxError::at(
        uri.clone(),
        attr.value.range.start,
        attr.value.range.end,
        &attr.name.to_string(),
        kind,
    )
}

/// How a typed value parses out of an attribute token
pub trait AttrValue: Default {
    /// Parse `raw`; errors are pinned to the value's range
    fn parse(raw: &str, uri: &Uri, attr: &Attribute) -> Result<Self, SyntaxError>;
}

/// A typed attribute with its source bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attr<V> {
    /// Ranges, attribute name, usage key
    pub base: AttrBase,

    /// The value text exactly as written
    pub raw: String,

    /// The parsed value; the type's default when parsing failed
    pub value: V,
}

impl<V> Attr<V> {
    /// The raw value text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Build an attribute that has no source location (output-only)
    pub fn synthesized(raw: impl Into<String>, value: V) -> Self {
        Self {
            base: AttrBase::default(),
            raw: raw.into(),
            value,
        }
    }
}

impl<V: AttrValue> AttrDecoder for Attr<V> {
    fn decode_attr(&mut self, uri: &Uri, attr: &Attribute) -> Result<(), SyntaxError> {
        self.raw = attr.value.value.clone();
        self.value = V::parse(&self.raw, uri, attr)?;
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

impl<V> Search for Attr<V> {
    fn search_tip(&self, pos: Position) -> Option<Tip> {
        self.base.tip_at(pos)
    }
}

impl AttrValue for String {
    fn parse(raw: &str, _uri: &Uri, _attr: &Attribute) -> Result<Self, SyntaxError> {
        Ok(raw.to_string())
    }
}

impl AttrValue for bool {
    fn parse(raw: &str, uri: &Uri, attr: &Attribute) -> Result<Self, SyntaxError> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(true),
            "false" | "f" | "0" => Ok(false),
            _ => Err(attr_error(uri, attr, ErrorKind::InvalidFormat)),
        }
    }
}

/// An HTTP method from the whitelist, stored uppercased
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MethodValue(pub String);

impl AttrValue for MethodValue {
    fn parse(raw: &str, uri: &Uri, attr: &Attribute) -> Result<Self, SyntaxError> {
        let upper = raw.to_ascii_uppercase();
        if METHODS.contains(&upper.as_str()) {
            Ok(Self(upper))
        } else {
            Err(attr_error(uri, attr, ErrorKind::InvalidValue))
        }
    }
}

/// An HTTP status code, 100..=599
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusValue(pub u16);

impl AttrValue for StatusValue {
    fn parse(raw: &str, uri: &Uri, attr: &Attribute) -> Result<Self, SyntaxError> {
        let code: u16 = raw
            .parse()
            .map_err(|_| attr_error(uri, attr, ErrorKind::InvalidFormat))?;
        if (100..600).contains(&code) {
            Ok(Self(code))
        } else {
            Err(attr_error(uri, attr, ErrorKind::InvalidValue))
        }
    }
}

/// A semantic version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionValue(pub Version);

impl Default for VersionValue {
    fn default() -> Self {
        Self(Version::new(0, 0, 0))
    }
}

impl AttrValue for VersionValue {
    fn parse(raw: &str, uri: &Uri, attr: &Attribute) -> Result<Self, SyntaxError> {
        Version::parse(raw)
            .map(Self)
            .map_err(|_| attr_error(uri, attr, ErrorKind::InvalidFormat))
    }
}

/// The document format version; must be major-compatible with ours
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocVersionValue(pub Version);

impl Default for DocVersionValue {
    fn default() -> Self {
        Self(Version::new(0, 0, 0))
    }
}

impl AttrValue for DocVersionValue {
    fn parse(raw: &str, uri: &Uri, attr: &Attribute) -> Result<Self, SyntaxError> {
        let v = Version::parse(raw)
            .map_err(|_| attr_error(uri, attr, ErrorKind::InvalidFormat))?;
        if !version::compatible(&v) {
            return Err(attr_error(uri, attr, ErrorKind::VersionIncompatible));
        }
        Ok(Self(v))
    }
}

/// A parameter's data type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeValue {
    /// No type given; only request bodies may stay untyped
    #[default]
    None,
    /// Boolean
    Bool,
    /// Object with `<param>` children
    Object,
    /// Number
    Number,
    /// String
    String,
}

impl AttrValue for TypeValue {
    fn parse(raw: &str, uri: &Uri, attr: &Attribute) -> Result<Self, SyntaxError> {
        match raw {
            "bool" => Ok(TypeValue::Bool),
            "object" => Ok(TypeValue::Object),
            "number" => Ok(TypeValue::Number),
            "string" => Ok(TypeValue::String),
            _ => Err(attr_error(uri, attr, ErrorKind::InvalidValue)),
        }
    }
}

/// An RFC 3339 timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateValue(pub Option<DateTime<FixedOffset>>);

impl AttrValue for DateValue {
    fn parse(raw: &str, uri: &Uri, attr: &Attribute) -> Result<Self, SyntaxError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|d| Self(Some(d)))
            .map_err(|_| attr_error(uri, attr, ErrorKind::InvalidFormat))
    }
}

/// Plain string attribute
pub type StringAttribute = Attr<String>;
/// Boolean attribute (`true`/`false`/`1`/`0`)
pub type BoolAttribute = Attr<bool>;
/// HTTP method attribute
pub type MethodAttribute = Attr<MethodValue>;
/// HTTP status attribute
pub type StatusAttribute = Attr<StatusValue>;
/// Semver attribute
pub type VersionAttribute = Attr<VersionValue>;
/// Document format version attribute
pub type DocVersionAttribute = Attr<DocVersionValue>;
/// Parameter type attribute
pub type TypeAttribute = Attr<TypeValue>;
/// RFC 3339 date attribute
pub type DateAttribute = Attr<DateValue>;

impl MethodAttribute {
    /// The uppercased method name
    pub fn method(&self) -> &str {
        &self.value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srcdoc_core::{Block, Location};
    use srcdoc_xml::{Parser, Token};

    fn attr_from(xml: &str) -> Attribute {
        let block = Block::new(Location::default(), xml.as_bytes().to_vec());
        let mut p = Parser::new(&block);
        match p.token().unwrap().unwrap() {
            Token::Start(s) => s.attributes.into_iter().next().unwrap(),
            t => panic!("unexpected token {t:?}"),
        }
    }

    fn parse_value<V: AttrValue>(xml: &str) -> Result<V, SyntaxError> {
        let attr = attr_from(xml);
        V::parse(&attr.value.value, &Uri::new("t"), &attr)
    }

    #[test]
    fn test_bool_values() {
        assert!(parse_value::<bool>(r#"<x a="true"/>"#).unwrap());
        assert!(parse_value::<bool>(r#"<x a="1"/>"#).unwrap());
        assert!(!parse_value::<bool>(r#"<x a="False"/>"#).unwrap());
        let err = parse_value::<bool>(r#"<x a="yes"/>"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
    }

    #[test]
    fn test_method_whitelist() {
        assert_eq!(parse_value::<MethodValue>(r#"<x a="get"/>"#).unwrap().0, "GET");
        let err = parse_value::<MethodValue>(r#"<x a="FETCH"/>"#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidValue);
    }

    #[test]
    fn test_status_range() {
        assert_eq!(parse_value::<StatusValue>(r#"<x a="200"/>"#).unwrap().0, 200);
        assert_eq!(
            parse_value::<StatusValue>(r#"<x a="abc"/>"#).unwrap_err().kind,
            ErrorKind::InvalidFormat
        );
        assert_eq!(
            parse_value::<StatusValue>(r#"<x a="600"/>"#).unwrap_err().kind,
            ErrorKind::InvalidValue
        );
        assert_eq!(
            parse_value::<StatusValue>(r#"<x a="99"/>"#).unwrap_err().kind,
            ErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_version_semver() {
        assert_eq!(
            parse_value::<VersionValue>(r#"<x a="1.2.3"/>"#).unwrap().0,
            Version::new(1, 2, 3)
        );
        assert_eq!(
            parse_value::<VersionValue>(r#"<x a="1.2"/>"#).unwrap_err().kind,
            ErrorKind::InvalidFormat
        );
    }

    #[test]
    fn test_doc_version_major_compatibility() {
        let ours = version::version();
        let ok = format!(r#"<x a="{}.99.0"/>"#, ours.major);
        assert!(parse_value::<DocVersionValue>(&ok).is_ok());

        let bad = format!(r#"<x a="{}.0.0"/>"#, ours.major + 1);
        assert_eq!(
            parse_value::<DocVersionValue>(&bad).unwrap_err().kind,
            ErrorKind::VersionIncompatible
        );
    }

    #[test]
    fn test_type_values() {
        assert_eq!(
            parse_value::<TypeValue>(r#"<x a="object"/>"#).unwrap(),
            TypeValue::Object
        );
        assert_eq!(
            parse_value::<TypeValue>(r#"<x a="float"/>"#).unwrap_err().kind,
            ErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_date_rfc3339() {
        assert!(parse_value::<DateValue>(r#"<x a="2020-01-02T15:04:05Z"/>"#).is_ok());
        assert_eq!(
            parse_value::<DateValue>(r#"<x a="2020-01-02"/>"#).unwrap_err().kind,
            ErrorKind::InvalidFormat
        );
    }

    #[test]
    fn test_error_pins_the_value_range() {
        let xml = r#"<x a="nope"/>"#;
        let err = parse_value::<bool>(xml).unwrap_err();
        let r = err.location.range;
        assert_eq!(&xml[r.start.offset..r.end.offset], "nope");
    }
}
