//! Transaction Notifier
//!
//! Outward sinks for the two user notifications: a transaction was sent
//! (with its signature and explorer link) and an error text.

use parking_lot::Mutex;
use solana_sdk::signature::Signature;
use tracing::{error, info};

/// Receives user-facing notifications.
pub trait Notifier: Send + Sync {
    /// A transaction was confirmed.
    fn transaction_sent(&self, signature: &Signature, explorer_url: &str);

    /// An operation failed; `text` is already user-facing.
    fn error(&self, text: &str);
}

/// Writes notifications to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn transaction_sent(&self, signature: &Signature, explorer_url: &str) {
        info!(%signature, explorer = explorer_url, "transaction sent");
    }

    fn error(&self, text: &str) {
        error!("{text}");
    }
}

/// A notification captured by [`RecordingNotifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    TransactionSent {
        signature: Signature,
        explorer_url: String,
    },
    Error(String),
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Error(text) => Some(text.clone()),
                Notification::TransactionSent { .. } => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn transaction_sent(&self, signature: &Signature, explorer_url: &str) {
        self.seen.lock().push(Notification::TransactionSent {
            signature: *signature,
            explorer_url: explorer_url.to_string(),
        });
    }

    fn error(&self, text: &str) {
        self.seen.lock().push(Notification::Error(text.to_string()));
    }
}
