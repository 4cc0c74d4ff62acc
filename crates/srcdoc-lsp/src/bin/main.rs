//! srcdoc language server binary
//!
//! Speaks LSP over stdio; typically launched by an editor.
//!
//! ```bash
//! # With debug logging (goes to stderr, stdio carries the protocol)
//! RUST_LOG=debug srcdoc-lsp
//! ```

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    srcdoc_lsp::run_stdio().await;
}
