//! Per-node cross-field validation
//!
//! Runs after an element decodes, with its final range known. Checks
//! that cross single fields: the route string versus its declared
//! parameters, duplicate siblings, object arity, richtext types.
//! Document-wide checks (unique servers, tags, api ids, method+path
//! pairs) live with the merge logic in [`crate::apidoc`].

use srcdoc_core::{ErrorKind, Range};
use srcdoc_xml::{Decoder, Sanitize};

use crate::attr::TypeValue;
use crate::elements::{
    Api, ApiDoc, Callback, Contact, Element, Enum, Example, Link, Param, Path, Request, Richtext,
    Server, Tag, XmlNamespace,
};

impl Sanitize for Api {}
impl Sanitize for Callback {}
impl Sanitize for Contact {}
impl Sanitize for Element {}
impl Sanitize for Enum {}
impl Sanitize for Example {}
impl Sanitize for Link {}
impl Sanitize for Server {}
impl Sanitize for Tag {}
impl Sanitize for XmlNamespace {}

/// The `{name}` placeholders of a route; `None` when braces are broken
fn path_params(path: &str) -> Option<Vec<&str>> {
    let mut out = Vec::new();
    let mut rest = path;
    loop {
        match rest.find('{') {
            None => {
                if rest.contains('}') {
                    return None;
                }
                return Some(out);
            }
            Some(i) => {
                let after = &rest[i + 1..];
                let j = after.find('}')?;
                if j == 0 {
                    return None;
                }
                out.push(&after[..j]);
                rest = &after[j + 1..];
            }
        }
    }
}

fn same_set(mut a: Vec<&str>, mut b: Vec<&str>) -> bool {
    a.sort_unstable();
    a.dedup();
    b.sort_unstable();
    b.dedup();
    a == b
}

/// Report duplicate `name` attributes among sibling parameters
fn report_duplicate_names(d: &mut Decoder<'_, '_>, params: &[Param]) {
    let mut seen: Vec<&str> = Vec::new();
    for p in params {
        let Some(name) = &p.name else { continue };
        if name.raw().is_empty() {
            continue;
        }
        if seen.contains(&name.raw()) {
            d.error_at(name.base.value_range, "name", ErrorKind::DuplicateValue);
        } else {
            seen.push(name.raw());
        }
    }
}

/// Report duplicate `value` attributes among sibling enums
fn report_duplicate_enums(d: &mut Decoder<'_, '_>, enums: &[Enum]) {
    let mut seen: Vec<&str> = Vec::new();
    for e in enums {
        let Some(value) = &e.value else { continue };
        if value.raw().is_empty() {
            continue;
        }
        if seen.contains(&value.raw()) {
            d.error_at(value.base.value_range, "value", ErrorKind::DuplicateValue);
        } else {
            seen.push(value.raw());
        }
    }
}

impl Sanitize for Path {
    fn sanitize(&mut self, d: &mut Decoder<'_, '_>, _range: Range) {
        if let Some(attr) = &self.path {
            let raw = attr.raw();
            if !raw.is_empty() {
                if !raw.starts_with('/') {
                    d.error_at(attr.base.value_range, "path", ErrorKind::InvalidFormat);
                } else {
                    match path_params(raw) {
                        None => {
                            d.error_at(attr.base.value_range, "path", ErrorKind::InvalidFormat)
                        }
                        Some(declared) => {
                            let named: Vec<&str> = self
                                .params
                                .iter()
                                .filter_map(|p| p.name.as_ref())
                                .map(|n| n.raw())
                                .collect();
                            if !same_set(declared, named) {
                                d.error_at(
                                    attr.base.value_range,
                                    "path",
                                    ErrorKind::InvalidValue,
                                );
                            }
                        }
                    }
                }
            }
        }

        report_duplicate_names(d, &self.params);
        report_duplicate_names(d, &self.queries);
    }
}

impl Sanitize for Param {
    fn sanitize(&mut self, d: &mut Decoder<'_, '_>, range: Range) {
        if let Some(t) = &self.ptype {
            match t.value {
                TypeValue::Object => {
                    if self.items.is_empty() {
                        d.required(range, "param");
                    }
                }
                TypeValue::None => {}
                _ => {
                    if !self.items.is_empty() {
                        d.error_at(t.base.value_range, "type", ErrorKind::InvalidValue);
                    }
                }
            }
        }

        report_duplicate_enums(d, &self.enums);
        report_duplicate_names(d, &self.items);
    }
}

impl Sanitize for Request {
    fn sanitize(&mut self, d: &mut Decoder<'_, '_>, range: Range) {
        if let Some(t) = &self.rtype {
            match t.value {
                TypeValue::Object => {
                    if self.items.is_empty() {
                        d.required(range, "param");
                    }
                }
                TypeValue::None => {}
                _ => {
                    if !self.items.is_empty() {
                        d.error_at(t.base.value_range, "type", ErrorKind::InvalidValue);
                    }
                }
            }
        }

        report_duplicate_enums(d, &self.enums);
        report_duplicate_names(d, &self.items);
        report_duplicate_names(d, &self.headers);
    }
}

impl Sanitize for Richtext {
    fn sanitize(&mut self, d: &mut Decoder<'_, '_>, _range: Range) {
        if let Some(t) = &self.rtype {
            if !t.raw.is_empty() && t.raw != "html" && t.raw != "markdown" {
                d.error_at(t.base.value_range, "type", ErrorKind::InvalidValue);
            }
        }
    }
}

impl Sanitize for ApiDoc {
    fn sanitize(&mut self, d: &mut Decoder<'_, '_>, _range: Range) {
        let mut seen: Vec<&str> = Vec::new();
        for tag in &self.tags {
            let Some(name) = &tag.name else { continue };
            if name.raw().is_empty() {
                continue;
            }
            if seen.contains(&name.raw()) {
                d.error_at(name.base.value_range, "name", ErrorKind::DuplicateValue);
            } else {
                seen.push(name.raw());
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for server in &self.servers {
            let Some(name) = &server.name else { continue };
            if name.raw().is_empty() {
                continue;
            }
            if seen.contains(&name.raw()) {
                d.error_at(name.base.value_range, "name", ErrorKind::DuplicateValue);
            } else {
                seen.push(name.raw());
            }
        }

        let mut seen: Vec<&str> = Vec::new();
        for mt in &self.mimetypes {
            let text = mt.text();
            if text.is_empty() {
                continue;
            }
            if seen.contains(&text) {
                d.error_at(mt.base.range, "mimetype", ErrorKind::DuplicateValue);
            } else {
                seen.push(text);
            }
        }

        // API uniqueness is document-wide and blocks arrive from many
        // files, so it is enforced at merge time instead; see
        // `ApiDoc::merge_api`.
    }
}
