//! Client Error Types
//!
//! This module defines every error the journal client can return.
//!
//! # Error Categories
//!
//! | Category | Variants | Origin |
//! |----------|----------|--------|
//! | Pre-flight | `InsufficientBalance`, `InvalidTitle` | Balance guard / address derivation, never reaches the network |
//! | Submission | `Transaction` | RPC / program rejection, classified |
//! | Read | `AccountNotFound`, `Decode` | Single entry fetch |
//! | Boundary | `Rpc`, `Wallet` | Connection or signer failures |
//! | Ambient | `Config`, `Io`, `Json` | Config file, keypair file, JSON |
//!
//! Submission failures cross the connection boundary as [`SubmitError`],
//! which keeps the program logs next to the message so they can be written
//! to the diagnostic log before classification.

use crate::classify::FailureKind;
use solana_program::pubkey::{Pubkey, MAX_SEED_LEN};
use thiserror::Error;

// =============================================================================
// ERROR ENUM
// =============================================================================

/// Errors that may be returned by the journal client.
#[derive(Error, Debug)]
pub enum JournalError {
    // =========================================================================
    // PRE-FLIGHT ERRORS
    // =========================================================================

    /// The cached wallet balance is below the create threshold.
    ///
    /// The message always starts with "Insufficient funds" so the failure
    /// classifier passes it through unchanged.
    #[error(
        "Insufficient funds. Creating an entry needs at least {minimum_sol} SOL; \
         add {shortfall_sol:.4} more SOL to your wallet."
    )]
    InsufficientBalance {
        /// Balance that was checked, in lamports
        balance: u64,

        /// Threshold in SOL
        minimum_sol: f64,

        /// `threshold - balance`, in SOL
        shortfall_sol: f64,
    },

    /// The title is too long to be a PDA seed, so no entry address exists
    /// for it.
    #[error(
        "Invalid title {title:?}: {len} bytes, titles are limited to {max} bytes",
        len = .title.len(),
        max = MAX_SEED_LEN
    )]
    InvalidTitle {
        title: String,
    },

    // =========================================================================
    // SUBMISSION ERRORS
    // =========================================================================

    /// A submitted transaction failed; `message` is the user-facing text.
    #[error("{message}")]
    Transaction {
        /// Category assigned by the classifier
        kind: FailureKind,

        /// Classified (or passed-through) message
        message: String,
    },

    // =========================================================================
    // READ ERRORS
    // =========================================================================

    /// No account exists at the address.
    #[error("Account does not exist: {0}")]
    AccountNotFound(Pubkey),

    /// The account exists but does not hold a journal entry.
    #[error("Account {address} is not a journal entry: {reason}")]
    Decode {
        address: Pubkey,
        reason: String,
    },

    // =========================================================================
    // BOUNDARY ERRORS
    // =========================================================================

    /// RPC read failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Keypair could not be loaded or could not sign.
    #[error("Wallet error: {0}")]
    Wallet(String),

    // =========================================================================
    // AMBIENT ERRORS
    // =========================================================================

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the crate.
pub type JournalResult<T> = Result<T, JournalError>;

// =============================================================================
// SUBMISSION ERROR (CONNECTION BOUNDARY)
// =============================================================================

/// A raw transaction submission failure as reported by a connection.
///
/// `kind` is set when the connection could map the failure to a category
/// from structured data (a `TransactionError`); otherwise the classifier
/// falls back to matching the message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmitError {
    /// Error text as produced by the RPC layer
    pub message: String,

    /// Program log lines emitted during simulation/execution
    pub logs: Vec<String>,

    /// Structured category, when known
    pub kind: Option<FailureKind>,
}

impl SubmitError {
    /// A failure known only by its message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            logs: Vec::new(),
            kind: None,
        }
    }

    /// Attach program logs.
    pub fn with_logs(mut self, logs: Vec<String>) -> Self {
        self.logs = logs;
        self
    }

    /// Attach a structured category.
    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = Some(kind);
        self
    }
}
