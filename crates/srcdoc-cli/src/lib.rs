//! srcdoc-cli - Command-line interface
//!
//! Subcommands: `build` (scan and write the output document), `check`
//! (diagnostics only), `detect` (write a starter `.srcdoc.yaml`),
//! `langs` (list supported languages), `lsp` (serve LSP over stdio).

pub mod app;

pub use app::run_cli;
