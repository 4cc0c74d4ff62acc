//! The restartable XML tokenizer
//!
//! Reads a block payload and produces positional tokens. Not a general
//! XML 1.0 parser: namespaces are prefix matching only, there is no
//! DTD, and only the five predefined entities are expanded. The parser
//! can be repositioned (`move_to`) and supports a one-token rewind
//! (`unread`) for the decoder's lookahead.
//!
//! Errors do not consume the offending token: the cursor is left where
//! the problem was found so the caller can skip ahead.

use srcdoc_core::{Block, ErrorKind, Lexer, Position, Range, SyntaxError, Uri};

use crate::token::{Attribute, EndElement, Instruction, Name, SpannedString, StartElement, Token};

/// Tokenizer over one block payload
pub struct Parser<'a> {
    uri: Uri,
    lexer: Lexer<'a>,
    rewind: Option<Token>,
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-')
}

impl<'a> Parser<'a> {
    /// Create a tokenizer positioned at the block's start
    pub fn new(block: &'a Block) -> Self {
        Self {
            uri: block.location.uri.clone(),
            lexer: Lexer::new(block),
            rewind: None,
        }
    }

    /// The document the block came from
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Current position, in file coordinates
    pub fn position(&self) -> Position {
        self.lexer.position()
    }

    /// Re-read from an earlier position; drops any pending rewind
    pub fn move_to(&mut self, pos: Position) {
        self.rewind = None;
        self.lexer.move_to(pos);
    }

    /// Push one token back; the next [`Parser::token`] returns it again
    pub fn unread(&mut self, token: Token) {
        debug_assert!(self.rewind.is_none(), "single-token rewind only");
        self.rewind = Some(token);
    }

    /// Build a syntax error pinned to a range in this document
    pub fn new_error(
        &self,
        start: Position,
        end: Position,
        field: &str,
        kind: ErrorKind,
    ) -> SyntaxError {
        SyntaxError::at(self.uri.clone(), start, end, field, kind)
    }

    /// Produce the next token; `None` at end of input
    pub fn token(&mut self) -> Result<Option<Token>, SyntaxError> {
        if let Some(t) = self.rewind.take() {
            return Ok(Some(t));
        }
        if self.lexer.at_eof() {
            return Ok(None);
        }

        if self.lexer.peek("<") {
            self.markup_token().map(Some)
        } else {
            self.text_token().map(Some)
        }
    }

    fn markup_token(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position();

        if self.lexer.match_literal("<!--") {
            return self.comment_token(start);
        }
        if self.lexer.match_literal("<![CDATA[") {
            return self.cdata_token(start);
        }
        if self.lexer.peek("<!") {
            // DOCTYPE and other declarations are rejected.
            let mut end = start;
            end.offset += 2;
            end.character += 2;
            return Err(self.new_error(start, end, "", ErrorKind::InvalidXml));
        }
        if self.lexer.match_literal("</") {
            return self.end_token(start);
        }
        if self.lexer.match_literal("<?") {
            return self.instruction_token(start);
        }

        self.lexer.match_literal("<");
        self.start_token(start)
    }

    fn comment_token(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let content_start = self.position();
        loop {
            if self.lexer.at_eof() {
                return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml));
            }
            if self.lexer.peek("-->") {
                let content_end = self.position();
                self.lexer.match_literal("-->");
                let value = String::from_utf8_lossy(
                    self.lexer.slice(content_start, content_end),
                )
                .into_owned();
                return Ok(Token::Comment(SpannedString::new(
                    value,
                    Range::new(start, self.position()),
                )));
            }
            if self.lexer.peek("--") {
                let at = self.position();
                let mut end = at;
                end.offset += 2;
                end.character += 2;
                return Err(self.new_error(at, end, "", ErrorKind::InvalidXml));
            }
            self.lexer.next_char();
        }
    }

    fn cdata_token(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let content_start = self.position();
        loop {
            if self.lexer.at_eof() {
                return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml));
            }
            if self.lexer.peek("]]>") {
                let content_end = self.position();
                self.lexer.match_literal("]]>");
                let value = String::from_utf8_lossy(
                    self.lexer.slice(content_start, content_end),
                )
                .into_owned();
                return Ok(Token::CData(SpannedString::new(
                    value,
                    Range::new(start, self.position()),
                )));
            }
            self.lexer.next_char();
        }
    }

    fn end_token(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let name = self.parse_name()?;
        self.skip_whitespace();
        if !self.lexer.match_literal(">") {
            return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml));
        }
        Ok(Token::End(EndElement {
            name,
            range: Range::new(start, self.position()),
        }))
    }

    fn instruction_token(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let name = self.parse_name_part()?;
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            if self.lexer.at_eof() {
                return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml));
            }
            if self.lexer.match_literal("?>") {
                return Ok(Token::Instruction(Instruction {
                    name,
                    attributes,
                    range: Range::new(start, self.position()),
                }));
            }
            attributes.push(self.parse_attribute()?);
        }
    }

    fn start_token(&mut self, start: Position) -> Result<Token, SyntaxError> {
        let name = self.parse_name()?;
        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            if self.lexer.at_eof() {
                return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml));
            }
            if self.lexer.match_literal("/>") {
                return Ok(Token::Start(StartElement {
                    name,
                    attributes,
                    self_closing: true,
                    range: Range::new(start, self.position()),
                }));
            }
            if self.lexer.match_literal(">") {
                return Ok(Token::Start(StartElement {
                    name,
                    attributes,
                    self_closing: false,
                    range: Range::new(start, self.position()),
                }));
            }
            attributes.push(self.parse_attribute()?);
        }
    }

    fn parse_attribute(&mut self) -> Result<Attribute, SyntaxError> {
        let start = self.position();
        let name = self.parse_name()?;
        self.skip_whitespace();
        if !self.lexer.match_literal("=") {
            return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml));
        }
        self.skip_whitespace();

        let quote = if self.lexer.match_literal("\"") {
            "\""
        } else if self.lexer.match_literal("'") {
            "'"
        } else {
            return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml));
        };

        let value_start = self.position();
        let mut value = String::new();
        loop {
            if self.lexer.at_eof() {
                return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml));
            }
            if self.lexer.peek(quote) {
                break;
            }
            if self.lexer.peek("&") {
                value.push(self.read_entity()?);
            } else {
                value.push_str(&String::from_utf8_lossy(self.lexer.next_char()));
            }
        }
        let value_end = self.position();
        self.lexer.match_literal(quote);

        Ok(Attribute {
            name,
            value: SpannedString::new(value, Range::new(value_start, value_end)),
            range: Range::new(start, self.position()),
        })
    }

    fn text_token(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position();
        let mut value = String::new();
        while !self.lexer.at_eof() && !self.lexer.peek("<") {
            if self.lexer.peek("&") {
                value.push(self.read_entity()?);
            } else {
                value.push_str(&String::from_utf8_lossy(self.lexer.next_char()));
            }
        }
        Ok(Token::Text(SpannedString::new(
            value,
            Range::new(start, self.position()),
        )))
    }

    fn read_entity(&mut self) -> Result<char, SyntaxError> {
        let start = self.position();
        self.lexer.match_literal("&");
        let mut name = String::new();
        loop {
            if self.lexer.at_eof() || name.len() > 8 {
                return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidEntity));
            }
            if self.lexer.match_literal(";") {
                break;
            }
            match self.lexer.rest().first() {
                Some(&b) if b.is_ascii_alphanumeric() || b == b'#' => {
                    name.push(b as char);
                    self.lexer.next(1);
                }
                _ => {
                    return Err(self.new_error(
                        start,
                        self.position(),
                        "",
                        ErrorKind::InvalidEntity,
                    ))
                }
            }
        }
        match name.as_str() {
            "lt" => Ok('<'),
            "gt" => Ok('>'),
            "amp" => Ok('&'),
            "quot" => Ok('"'),
            "apos" => Ok('\''),
            _ => Err(self.new_error(start, self.position(), &name, ErrorKind::InvalidEntity)),
        }
    }

    fn parse_name(&mut self) -> Result<Name, SyntaxError> {
        let start = self.position();
        let first = self.parse_name_part()?;
        if self.lexer.match_literal(":") {
            let local = self.parse_name_part()?;
            Ok(Name {
                prefix: first,
                local,
                range: Range::new(start, self.position()),
            })
        } else {
            Ok(Name {
                prefix: SpannedString::new("", Range::new(start, start)),
                local: first,
                range: Range::new(start, self.position()),
            })
        }
    }

    fn parse_name_part(&mut self) -> Result<SpannedString, SyntaxError> {
        let start = self.position();
        match self.lexer.rest().first() {
            Some(&b) if is_name_start(b) => {
                self.lexer.next(1);
            }
            _ => return Err(self.new_error(start, self.position(), "", ErrorKind::InvalidXml)),
        }
        while let Some(&b) = self.lexer.rest().first() {
            if is_name_char(b) {
                self.lexer.next(1);
            } else {
                break;
            }
        }
        let end = self.position();
        Ok(SpannedString::new(
            String::from_utf8_lossy(self.lexer.slice(start, end)).into_owned(),
            Range::new(start, end),
        ))
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.lexer.rest().first() {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.lexer.next(1);
            } else {
                break;
            }
        }
    }
}
