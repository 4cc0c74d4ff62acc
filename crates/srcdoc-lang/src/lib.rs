//! srcdoc-lang - Language registry and comment-block scanning
//!
//! Each supported source language is an ordered list of [`Blocker`]
//! strategies: comment delimiters that yield documentation blocks and
//! string delimiters that exist only so their bodies are skipped. The
//! [`scan`] loop walks a file through those strategies and emits the
//! surviving payloads as [`srcdoc_core::Block`]s.

pub mod blocker;
pub mod php;
pub mod registry;
pub mod scanner;

pub use blocker::{BlockComment, Blocker, LineComment, PascalString, StringBlock};
pub use php::PhpDocBlock;
pub use registry::{get, get_by_ext, languages, Language};
pub use scanner::scan;
