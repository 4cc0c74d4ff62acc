//! srcdoc-core - Shared primitives for the srcdoc toolchain
//!
//! This crate defines the vocabulary every other srcdoc crate speaks:
//! zero-based source positions and ranges, URIs, extracted comment
//! blocks, the severity-typed diagnostic bus, and the position-tracked
//! byte cursor the scanners and the XML tokenizer are built on.

pub mod block;
pub mod error;
pub mod lexer;
pub mod message;
pub mod position;
pub mod uri;
pub mod version;

pub use block::Block;
pub use error::{ErrorKind, SyntaxError};
pub use lexer::Lexer;
pub use message::{Message, MessageHandler, Severity};
pub use position::{Location, Position, Range};
pub use uri::Uri;
pub use version::{compatible, VERSION};
