//! The comment-block scanner
//!
//! Runs a file's blocker list from start to end. At every position the
//! first blocker whose `begin_match` succeeds claims the region; empty
//! payloads (strings) are consumed silently, non-empty ones become
//! blocks. When no blocker matches, the cursor advances one code point.

use srcdoc_core::{Block, ErrorKind, Lexer, Location, MessageHandler, Range, SyntaxError};

use crate::blocker::Blocker;

/// Scan `file` and hand every documentation block to `emit`
///
/// `file` is the whole source document wrapped as a block (data =
/// decoded bytes, range start = the zero position). A region whose
/// closing delimiter is missing is reported as `NotFoundEndFlag` at
/// the region's start and aborts the rest of the file; everything
/// scanned before it has already been emitted.
pub fn scan(
    file: &Block,
    blockers: &[Box<dyn Blocker>],
    h: &MessageHandler,
    mut emit: impl FnMut(Block),
) {
    let uri = &file.location.uri;
    let mut l = Lexer::new(file);

    while !l.at_eof() {
        let start = l.position();
        let Some(blocker) = blockers.iter().find(|b| b.begin_match(&mut l)) else {
            l.next_char();
            continue;
        };

        let (data, found) = blocker.end_scan(&mut l);
        if !found {
            h.error(SyntaxError::at(
                uri.clone(),
                start,
                l.position(),
                "",
                ErrorKind::NotFoundEndFlag,
            ));
            return;
        }
        if data.is_empty() {
            continue;
        }

        emit(Block::new(
            Location::new(uri.clone(), Range::new(start, l.position())),
            data,
        ));
    }
}
