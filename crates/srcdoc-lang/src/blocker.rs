//! Delimiter strategies
//!
//! A [`Blocker`] recognizes one kind of delimited region. Comment
//! blockers extract a payload; string blockers return an empty payload
//! so the scanner consumes the region silently, which is what keeps a
//! `//` inside a string literal from becoming a documentation block.
//!
//! Payloads keep the byte layout of the source region: delimiters and
//! comment gutters are blanked to spaces, never removed, so positions
//! computed inside a payload line up with the file.

use srcdoc_core::Lexer;

/// A delimited-region strategy
pub trait Blocker: Send {
    /// Test for the opening delimiter, advancing past it on success
    fn begin_match(&self, l: &mut Lexer) -> bool;

    /// Advance to the matching closing delimiter
    ///
    /// Returns the extracted payload and whether the close was found.
    /// An empty payload with `true` means the region is consumed but
    /// produces no block. On `false` the cursor sits at EOF.
    fn end_scan(&self, l: &mut Lexer) -> (Vec<u8>, bool);
}

/// Blank the leading delimiter-symbol run on every payload line
///
/// Lines whose first non-whitespace characters are drawn from `symbols`
/// and are followed by whitespace or end-of-line get that run replaced
/// by spaces. This is what turns ` * ` gutters and `///` openers into
/// plain indentation without moving any byte.
fn blank_gutters(data: &mut [u8], symbols: &str) {
    let is_symbol = |b: u8| symbols.as_bytes().contains(&b);

    let mut i = 0;
    while i < data.len() {
        // Start of line: skip indentation.
        while i < data.len() && (data[i] == b' ' || data[i] == b'\t') {
            i += 1;
        }
        let run_start = i;
        while i < data.len() && is_symbol(data[i]) {
            i += 1;
        }
        let run_end = i;
        let at_boundary = i >= data.len()
            || data[i] == b' '
            || data[i] == b'\t'
            || data[i] == b'\n'
            || data[i] == b'\r';
        if run_end > run_start && at_boundary {
            for b in &mut data[run_start..run_end] {
                *b = b' ';
            }
        }
        // Move to the next line.
        while i < data.len() && data[i] != b'\n' {
            i += 1;
        }
        i += 1;
    }
}

fn spaces(n: usize) -> Vec<u8> {
    vec![b' '; n]
}

/// A line comment such as `//` or `#`
///
/// Consecutive comment lines, optionally indented, merge into a single
/// block so multi-line documentation written in line comments parses
/// as one payload.
pub struct LineComment {
    open: &'static str,
}

impl LineComment {
    /// Create a line-comment blocker for `open`
    pub fn new(open: &'static str) -> Self {
        Self { open }
    }
}

impl Blocker for LineComment {
    fn begin_match(&self, l: &mut Lexer) -> bool {
        l.match_literal(self.open)
    }

    fn end_scan(&self, l: &mut Lexer) -> (Vec<u8>, bool) {
        let mut out = spaces(self.open.len());
        loop {
            // Rest of the current comment line, including its break.
            while !l.at_eof() {
                let b = l.next(1)[0];
                out.push(b);
                if b == b'\n' {
                    break;
                }
            }

            // A following line that is itself a comment continues the run.
            let resume = l.position();
            let mut ws = Vec::new();
            while !l.at_eof() {
                match l.rest()[0] {
                    b @ (b' ' | b'\t') => {
                        ws.push(b);
                        l.next(1);
                    }
                    _ => break,
                }
            }
            if l.at_eof() || !l.match_literal(self.open) {
                l.move_to(resume);
                break;
            }
            out.extend_from_slice(&ws);
            out.extend_from_slice(&spaces(self.open.len()));
        }

        blank_gutters(&mut out, self.open);
        (out, true)
    }
}

/// A block comment such as `/* … */`, optionally nesting
pub struct BlockComment {
    open: &'static str,
    close: &'static str,
    nested: bool,
}

impl BlockComment {
    /// Create a non-nesting block comment (C style)
    pub fn new(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close,
            nested: false,
        }
    }

    /// Create a nesting block comment (Rust style)
    pub fn nested(open: &'static str, close: &'static str) -> Self {
        Self {
            open,
            close,
            nested: true,
        }
    }
}

impl Blocker for BlockComment {
    fn begin_match(&self, l: &mut Lexer) -> bool {
        l.match_literal(self.open)
    }

    fn end_scan(&self, l: &mut Lexer) -> (Vec<u8>, bool) {
        let mut out = spaces(self.open.len());
        let mut depth = 1usize;
        loop {
            if l.at_eof() {
                return (out, false);
            }
            if self.nested && l.peek(self.open) {
                l.match_literal(self.open);
                out.extend_from_slice(self.open.as_bytes());
                depth += 1;
                continue;
            }
            if l.peek(self.close) {
                l.match_literal(self.close);
                depth -= 1;
                if depth == 0 {
                    out.extend_from_slice(&spaces(self.close.len()));
                    blank_gutters(&mut out, self.open);
                    return (out, true);
                }
                out.extend_from_slice(self.close.as_bytes());
                continue;
            }
            out.extend_from_slice(l.next_char());
        }
    }
}

/// A string literal whose body must be skipped
///
/// Never emits a payload; its sole purpose is to keep comment openers
/// inside string bodies from starting a block.
pub struct StringBlock {
    open: &'static str,
    close: &'static str,
    escape: Option<&'static str>,
}

impl StringBlock {
    /// Create a string blocker with an optional escape sequence
    pub fn new(open: &'static str, close: &'static str, escape: Option<&'static str>) -> Self {
        Self { open, close, escape }
    }
}

impl Blocker for StringBlock {
    fn begin_match(&self, l: &mut Lexer) -> bool {
        l.match_literal(self.open)
    }

    fn end_scan(&self, l: &mut Lexer) -> (Vec<u8>, bool) {
        (Vec::new(), l.delim_string(self.close, self.escape))
    }
}

/// A Pascal/SQL-style string where the escape is the doubled quote
pub struct PascalString {
    symbol: &'static str,
    escape: &'static str,
}

impl PascalString {
    /// Create a doubled-quote string blocker for `symbol`
    pub fn new(symbol: &'static str, escape: &'static str) -> Self {
        debug_assert_eq!(escape.len(), symbol.len() * 2);
        Self { symbol, escape }
    }
}

impl Blocker for PascalString {
    fn begin_match(&self, l: &mut Lexer) -> bool {
        l.match_literal(self.symbol)
    }

    fn end_scan(&self, l: &mut Lexer) -> (Vec<u8>, bool) {
        loop {
            if l.at_eof() {
                return (Vec::new(), false);
            }
            if l.match_literal(self.escape) {
                continue;
            }
            if l.match_literal(self.symbol) {
                return (Vec::new(), true);
            }
            l.next_char();
        }
    }
}
