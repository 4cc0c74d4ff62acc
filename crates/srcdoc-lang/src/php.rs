//! PHP heredoc / nowdoc skipping
//!
//! `<<<IDENT` and `<<<'IDENT'` open string bodies that may well contain
//! things that look like documentation comments; the whole body has to
//! be consumed without producing a block. The closing identifier is
//! accepted both bare and with a trailing semicolon.

use std::cell::RefCell;

use srcdoc_core::Lexer;

use crate::blocker::Blocker;

struct EndTokens {
    bare: String,     // \nIDENT\n
    semicolon: String, // \nIDENT;\n
}

/// Blocker for `<<<IDENT … IDENT` and `<<<'IDENT' … IDENT` strings
///
/// `begin_match` records the closing tokens for the identifier it just
/// read; `end_scan` consumes everything up to and including whichever
/// closer appears first. Each scan owns its own instance, so the
/// carried state never crosses files.
pub struct PhpDocBlock {
    state: RefCell<Option<EndTokens>>,
}

impl PhpDocBlock {
    /// Create a heredoc/nowdoc blocker
    pub fn new() -> Self {
        Self {
            state: RefCell::new(None),
        }
    }
}

impl Default for PhpDocBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl Blocker for PhpDocBlock {
    fn begin_match(&self, l: &mut Lexer) -> bool {
        let start = l.position();

        if !l.match_literal("<<<") {
            return false;
        }
        let nowdoc = l.match_literal("'");

        let mut ident = String::new();
        while let Some(&b) = l.rest().first() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                ident.push(b as char);
                l.next(1);
            } else {
                break;
            }
        }
        if ident.is_empty() {
            l.move_to(start);
            return false;
        }
        if nowdoc && !l.match_literal("'") {
            l.move_to(start);
            return false;
        }
        if !l.match_literal("\r\n") && !l.match_literal("\n") {
            l.move_to(start);
            return false;
        }

        *self.state.borrow_mut() = Some(EndTokens {
            bare: format!("\n{ident}\n"),
            semicolon: format!("\n{ident};\n"),
        });
        true
    }

    fn end_scan(&self, l: &mut Lexer) -> (Vec<u8>, bool) {
        let tokens = match self.state.borrow_mut().take() {
            Some(t) => t,
            None => return (Vec::new(), false),
        };

        loop {
            if l.at_eof() {
                return (Vec::new(), false);
            }
            if l.match_literal(&tokens.bare) || l.match_literal(&tokens.semicolon) {
                return (Vec::new(), true);
            }
            l.next_char();
        }
    }
}
