//! The diagnostic bus
//!
//! Scanners, the decoder and the controller all report through a
//! [`MessageHandler`]. Messages are queued on an unbounded channel and
//! delivered to the host's sink from a dedicated thread, so producers
//! never block on a slow sink and errors are never dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use serde::Serialize;

use crate::error::SyntaxError;
use crate::position::Location;

/// How serious a message is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// An error: the build will not write output
    Erro,
    /// A warning: suspicious but not fatal
    Warn,
    /// Informational
    Info,
    /// A success notice
    Succ,
}

/// A severity-tagged, localizable, range-pinned message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Severity of the message
    pub severity: Severity,

    /// Where the message points
    pub location: Location,

    /// The schema field involved, when there is one
    pub field: String,

    /// Localization key the host resolves
    pub key: String,

    /// Arguments for the localized message
    pub args: Vec<String>,
}

impl Message {
    /// Wrap a syntax error as a message of the given severity
    pub fn from_error(severity: Severity, err: SyntaxError) -> Self {
        Self {
            severity,
            location: err.location,
            field: err.field,
            key: err.kind.key().to_string(),
            args: err.args,
        }
    }

    /// Build an informational message
    pub fn note(severity: Severity, location: Location, key: impl Into<String>) -> Self {
        Self {
            severity,
            location,
            field: String::new(),
            key: key.into(),
            args: Vec::new(),
        }
    }
}

struct Inner {
    tx: Mutex<Option<Sender<Message>>>,
    errors: AtomicUsize,
    delivery: Mutex<Option<JoinHandle<()>>>,
}

/// Fan-in point for diagnostics
///
/// Cheap to clone; all clones feed the same sink. [`MessageHandler::
/// stop`] closes the queue and waits until every queued message has
/// been delivered.
#[derive(Clone)]
pub struct MessageHandler {
    inner: Arc<Inner>,
}

impl MessageHandler {
    /// Create a handler delivering to `sink`
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(Message) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Message>();
        let delivery = std::thread::spawn(move || {
            for msg in rx {
                sink(msg);
            }
        });

        Self {
            inner: Arc::new(Inner {
                tx: Mutex::new(Some(tx)),
                errors: AtomicUsize::new(0),
                delivery: Mutex::new(Some(delivery)),
            }),
        }
    }

    /// A handler that discards everything; useful in tests
    pub fn discard() -> Self {
        Self::new(|_| {})
    }

    /// Queue a message
    pub fn message(&self, msg: Message) {
        if msg.severity == Severity::Erro {
            self.inner.errors.fetch_add(1, Ordering::Relaxed);
        }
        if let Ok(guard) = self.inner.tx.lock() {
            if let Some(tx) = guard.as_ref() {
                // Receiver only goes away on stop(); a failed send
                // after that point has nowhere to go anyway.
                let _ = tx.send(msg);
            }
        }
    }

    /// Queue a syntax error with `Erro` severity
    pub fn error(&self, err: SyntaxError) {
        self.message(Message::from_error(Severity::Erro, err));
    }

    /// Queue a syntax error with `Warn` severity
    pub fn warn(&self, err: SyntaxError) {
        self.message(Message::from_error(Severity::Warn, err));
    }

    /// Queue an informational note
    pub fn info(&self, location: Location, key: impl Into<String>) {
        self.message(Message::note(Severity::Info, location, key));
    }

    /// Queue a success note
    pub fn succ(&self, location: Location, key: impl Into<String>) {
        self.message(Message::note(Severity::Succ, location, key));
    }

    /// How many `Erro` messages have been queued so far
    pub fn error_count(&self) -> usize {
        self.inner.errors.load(Ordering::Relaxed)
    }

    /// Close the queue and wait for delivery to finish
    ///
    /// Subsequent messages are silently discarded. Safe to call more
    /// than once.
    pub fn stop(&self) {
        if let Ok(mut guard) = self.inner.tx.lock() {
            guard.take();
        }
        let handle = match self.inner.delivery.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::position::{Position, Range};
    use crate::uri::Uri;
    use std::sync::mpsc::channel;

    fn sample_error() -> SyntaxError {
        SyntaxError::at(
            Uri::new("a.go"),
            Position::default(),
            Position::new(0, 3, 3),
            "",
            ErrorKind::InvalidXml,
        )
    }

    #[test]
    fn test_messages_are_delivered_in_order() {
        let (tx, rx) = channel();
        let h = MessageHandler::new(move |m: Message| {
            tx.send(m.key).unwrap();
        });

        h.error(sample_error());
        h.warn(sample_error());
        h.info(Location::default(), "build-complete");
        h.stop();

        let keys: Vec<String> = rx.iter().collect();
        assert_eq!(keys, vec!["err-invalid-xml", "err-invalid-xml", "build-complete"]);
    }

    #[test]
    fn test_error_count() {
        let h = MessageHandler::discard();
        assert_eq!(h.error_count(), 0);
        h.error(sample_error());
        h.warn(sample_error());
        h.error(sample_error());
        h.stop();
        assert_eq!(h.error_count(), 2);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let h = MessageHandler::discard();
        h.stop();
        h.stop();
        h.message(Message::note(Severity::Info, Location::default(), "late"));
    }

    #[test]
    fn test_clones_share_the_sink() {
        let (tx, rx) = channel();
        let h = MessageHandler::new(move |m: Message| {
            tx.send(m.key).unwrap();
        });
        let h2 = h.clone();
        h2.error(sample_error());
        h.stop();
        assert_eq!(rx.iter().count(), 1);
        assert_eq!(h2.error_count(), 1);
    }
}
