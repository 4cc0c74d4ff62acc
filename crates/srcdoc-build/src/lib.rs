//! srcdoc-build - Configuration, ingestion and output
//!
//! Ties the pipeline together: a [`Config`] names inputs and an
//! output, the controller fans file scanning out over worker tasks and
//! funnels every block into one decoder, and the result serializes as
//! `apidoc` XML, OpenAPI 3, or a JSON tree dump.

pub mod config;
pub mod controller;
pub mod input;
pub mod openapi;
pub mod output;

pub use config::{Config, CONFIG_FILENAMES};
pub use controller::{build, buffer, check_syntax, parse, parse_inputs, ParseOptions};
pub use input::Input;
pub use output::{Output, OutputKind};

use srcdoc_core::{MessageHandler, SyntaxError};

impl Config {
    /// Parse, serialize and write the configured output
    pub async fn build(&self, h: &MessageHandler) -> Result<bool, SyntaxError> {
        controller::build(h, &self.output, &self.inputs, &ParseOptions::default()).await
    }

    /// Parse and return the serialized output bytes
    pub async fn buffer(&self, h: &MessageHandler) -> Result<Vec<u8>, SyntaxError> {
        controller::buffer(h, &self.output, &self.inputs, &ParseOptions::default()).await
    }

    /// Parse for diagnostics only
    pub async fn check_syntax(&self, h: &MessageHandler) {
        controller::check_syntax(h, &self.inputs, &ParseOptions::default()).await
    }
}
