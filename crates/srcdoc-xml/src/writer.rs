//! XML output
//!
//! A small push writer the document tree serializes through. Attribute
//! order follows the schema declaration order, elements nest with
//! two-space indentation, and text/CDATA content stays inline so the
//! output re-parses to the same tree.

/// Serialization half of a schema node
pub trait EncodeXml {
    /// Write this node as `<tag …>…</tag>`
    ///
    /// The tag name comes from the *member* that holds the node: the
    /// same node type serializes as `<param>`, `<header>` or `<query>`
    /// depending on where it sits.
    fn encode(&self, w: &mut XmlWriter, tag: &str);
}

#[derive(Default)]
struct Frame {
    has_child_elems: bool,
    has_text: bool,
}

/// Streaming XML writer
pub struct XmlWriter {
    buf: String,
    stack: Vec<Frame>,
    tag_open: bool,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            stack: Vec::new(),
            tag_open: false,
        }
    }

    /// Write a processing instruction such as the XML declaration
    pub fn instruction(&mut self, name: &str, body: &str) {
        debug_assert!(self.stack.is_empty(), "instructions go before the root");
        self.buf.push_str("<?");
        self.buf.push_str(name);
        if !body.is_empty() {
            self.buf.push(' ');
            self.buf.push_str(body);
        }
        self.buf.push_str("?>\n");
    }

    fn seal(&mut self) {
        if self.tag_open {
            self.buf.push('>');
            self.tag_open = false;
        }
    }

    /// Open an element
    pub fn open(&mut self, tag: &str) {
        self.seal();
        if let Some(parent) = self.stack.last_mut() {
            parent.has_child_elems = true;
            self.buf.push('\n');
            for _ in 0..self.stack.len() {
                self.buf.push_str("  ");
            }
        }
        self.buf.push('<');
        self.buf.push_str(tag);
        self.tag_open = true;
        self.stack.push(Frame::default());
    }

    /// Add an attribute to the element just opened
    pub fn attr(&mut self, name: &str, value: &str) {
        debug_assert!(self.tag_open, "attributes go right after open()");
        self.buf.push(' ');
        self.buf.push_str(name);
        self.buf.push_str("=\"");
        self.buf.push_str(&escape_attr(value));
        self.buf.push('"');
    }

    /// Write text content, escaping markup characters
    pub fn text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.seal();
        self.buf.push_str(&escape_text(s));
        if let Some(f) = self.stack.last_mut() {
            f.has_text = true;
        }
    }

    /// Write a CDATA section, content verbatim
    pub fn cdata(&mut self, s: &str) {
        self.seal();
        self.buf.push_str("<![CDATA[");
        self.buf.push_str(s);
        self.buf.push_str("]]>");
        if let Some(f) = self.stack.last_mut() {
            f.has_text = true;
        }
    }

    /// Close the innermost element
    pub fn close(&mut self, tag: &str) {
        let frame = self.stack.pop().expect("close without matching open");
        if self.tag_open {
            self.buf.push_str("/>");
            self.tag_open = false;
            return;
        }
        if frame.has_child_elems && !frame.has_text {
            self.buf.push('\n');
            for _ in 0..self.stack.len() {
                self.buf.push_str("  ");
            }
        }
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    /// The serialized document
    pub fn finish(self) -> String {
        debug_assert!(self.stack.is_empty(), "unclosed elements");
        self.buf
    }
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether `s` contains characters that are significant in markup
///
/// Used to decide when rich text bodies must be emitted as CDATA.
pub fn needs_cdata(s: &str) -> bool {
    s.contains('<') || s.contains('>') || s.contains('&')
}
