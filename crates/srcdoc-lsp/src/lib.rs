//! srcdoc-lsp - Language Server Protocol glue
//!
//! Wraps the core surface (open / change / close / lookup) in a
//! tower-lsp backend: full-text document sync feeds the scanners,
//! diagnostics from the message bus publish per file, and hovers
//! answer with the usage key of the innermost documented node.

pub mod backend;
pub mod folder;

pub use backend::{run_stdio, Backend};
pub use folder::Folder;
