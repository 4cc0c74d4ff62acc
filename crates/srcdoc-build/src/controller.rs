//! The ingestion controller
//!
//! Fan-out, fan-in: one worker task per source file (bounded by a
//! semaphore sized to the machine), a bounded block channel for
//! backpressure, and a single decoder consuming blocks because the
//! tree is one shared mutable value. Cancellation stops workers at the
//! next block boundary; the decoder drains what was already queued.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use srcdoc_ast::ApiDoc;
use srcdoc_core::{Block, ErrorKind, Location, MessageHandler, Range, SyntaxError, Uri};

use crate::input::Input;
use crate::output::Output;

/// Channel capacity between workers and the decoder
const BLOCK_CHANNEL_CAPACITY: usize = 256;

/// Knobs for one parse run
#[derive(Clone)]
pub struct ParseOptions {
    /// Cooperative cancellation for all workers
    pub cancel: CancellationToken,

    /// Process files one at a time, in input order
    ///
    /// The merged document's API order is then deterministic, which
    /// tests rely on.
    pub serial: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
            serial: false,
        }
    }
}

fn read_error(uri: &Uri, e: &std::io::Error) -> SyntaxError {
    let kind = if e.kind() == std::io::ErrorKind::NotFound {
        ErrorKind::DirNotExists
    } else {
        ErrorKind::InvalidValue
    };
    SyntaxError::new(Location::new(uri.clone(), Range::default()), "", kind)
        .with_args([e.to_string()])
}

/// Read, decode and scan one file
async fn scan_path(input: &Input, h: &MessageHandler, uri: &Uri) -> Vec<Block> {
    let path = match uri.to_file_path() {
        Ok(p) => p,
        Err(e) => {
            h.error(read_error(uri, &e));
            return Vec::new();
        }
    };
    let data = match tokio::fs::read(&path).await {
        Ok(d) => d,
        Err(e) => {
            h.error(read_error(uri, &e));
            return Vec::new();
        }
    };
    let data = input.decode_bytes(h, uri, data);
    input.scan_file(h, uri, data)
}

/// Scan every input and merge the blocks into `doc`
///
/// Inputs must be sanitized. Within one file, blocks arrive in file
/// order; across files the order is unspecified unless
/// [`ParseOptions::serial`] is set.
pub async fn parse_inputs(
    doc: &mut ApiDoc,
    h: &MessageHandler,
    inputs: &[Input],
    opts: &ParseOptions,
) {
    if opts.serial {
        for input in inputs {
            for uri in input.paths() {
                if opts.cancel.is_cancelled() {
                    return;
                }
                for block in scan_path(input, h, uri).await {
                    doc.parse(h, &block);
                }
            }
        }
        return;
    }

    let pool = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let permits = Arc::new(Semaphore::new(pool));
    let (tx, mut rx) = mpsc::channel::<Block>(BLOCK_CHANNEL_CAPACITY);

    let mut workers: JoinSet<()> = JoinSet::new();
    for input in inputs {
        for uri in input.paths() {
            let input = input.clone();
            let uri = uri.clone();
            let tx = tx.clone();
            let h = h.clone();
            let cancel = opts.cancel.clone();
            let permits = Arc::clone(&permits);
            workers.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    return;
                }
                debug!(file = %uri, "scanning");
                for block in scan_path(&input, &h, &uri).await {
                    if cancel.is_cancelled() {
                        return;
                    }
                    if tx.send(block).await.is_err() {
                        return;
                    }
                }
            });
        }
    }
    drop(tx);

    let h2 = h.clone();
    let drive_workers = async move {
        while let Some(result) = workers.join_next().await {
            // A panicking scanner aborts that file only.
            if let Err(e) = result {
                h2.error(
                    SyntaxError::new(Location::default(), "", ErrorKind::InvalidValue)
                        .with_args([e.to_string()]),
                );
            }
        }
    };
    let decode = async {
        while let Some(block) = rx.recv().await {
            doc.parse(h, &block);
        }
    };
    tokio::join!(drive_workers, decode);
}

/// Parse every input into a fresh document
pub async fn parse(h: &MessageHandler, inputs: &[Input], opts: &ParseOptions) -> ApiDoc {
    let mut doc = ApiDoc::default();
    parse_inputs(&mut doc, h, inputs, opts).await;
    doc
}

/// Parse, serialize, and write the output document
///
/// Returns whether the output was written: a run that produced any
/// `Erro` diagnostic, or no API at all, writes nothing.
pub async fn build(
    h: &MessageHandler,
    output: &Output,
    inputs: &[Input],
    opts: &ParseOptions,
) -> Result<bool, SyntaxError> {
    let doc = parse(h, inputs, opts).await;
    if h.error_count() > 0 || doc.apis.is_empty() {
        return Ok(false);
    }

    let buf = output.buffer(&doc)?;
    output.path.write_all(&buf).map_err(|e| {
        SyntaxError::new(
            Location::new(output.path.clone(), Range::default()),
            "output.path",
            ErrorKind::InvalidValue,
        )
        .with_args([e.to_string()])
    })?;

    h.succ(
        Location::new(output.path.clone(), Range::default()),
        "build-complete",
    );
    Ok(true)
}

/// Parse and serialize without writing anywhere
pub async fn buffer(
    h: &MessageHandler,
    output: &Output,
    inputs: &[Input],
    opts: &ParseOptions,
) -> Result<Vec<u8>, SyntaxError> {
    let doc = parse(h, inputs, opts).await;
    output.buffer(&doc)
}

/// Parse for diagnostics only, discarding the tree
pub async fn check_syntax(h: &MessageHandler, inputs: &[Input], opts: &ParseOptions) {
    let _ = parse(h, inputs, opts).await;
    if h.error_count() == 0 {
        h.succ(Location::default(), "syntax-ok");
    }
}
