//! Submission Failure Classification
//!
//! Turns a raw submission failure into one of a closed set of categories
//! and a user-facing message.
//!
//! # Resolution Order
//!
//! 1. A structured [`FailureKind`] supplied by the connection (mapped from a
//!    `TransactionError`) wins.
//! 2. Otherwise the message text is matched, first match wins:
//!
//! | # | Signal | Result |
//! |---|--------|--------|
//! | 1 | `Insufficient funds` | unchanged |
//! | 2 | `insufficient lamports`, `custom program error: 0x1`, rent/fee phrases | standard insufficient-funds text |
//! | 3 | `already in use` | entry already exists |
//! | 4 | `simulation failed`, `reverted` | generic simulation text |
//! | 5 | `custom program error`, `program error`, `AnchorError` | `Program error: ...` |
//! | 6 | anything else | unchanged |

use crate::error::SubmitError;
use crate::guard::MIN_CREATE_BALANCE_SOL;
use solana_sdk::{instruction::InstructionError, transaction::TransactionError};

// =============================================================================
// FAILURE KINDS
// =============================================================================

/// Closed set of submission failure categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Wallet cannot cover rent and fees
    InsufficientFunds,

    /// An entry with the same title already exists for the owner
    AlreadyExists,

    /// Preflight simulation failed without a more specific signal
    SimulationFailed,

    /// The program returned an error of its own
    ProgramError,

    /// Nothing matched; the original message is shown
    Unclassified,
}

/// A classified failure: category plus the text shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classified {
    pub kind: FailureKind,
    pub message: String,
}

/// Rewritten message for low-level insufficient-funds failures.
pub fn insufficient_funds_explanation() -> String {
    format!(
        "Insufficient funds: creating an entry needs about {MIN_CREATE_BALANCE_SOL} SOL \
         to cover account rent and transaction fees. Fund your wallet and try again."
    )
}

/// Rewritten message for duplicate titles.
pub const ALREADY_EXISTS_EXPLANATION: &str =
    "An entry with this title already exists for your wallet. Choose a different title.";

/// Rewritten message for otherwise unexplained simulation failures.
pub const SIMULATION_FAILED_EXPLANATION: &str =
    "Transaction simulation failed. This is likely due to insufficient funds \
     or an existing account with this title.";

impl FailureKind {
    /// User-facing text for this category given the original message.
    pub fn describe(self, original: &str) -> String {
        match self {
            FailureKind::InsufficientFunds => {
                if original.contains("Insufficient funds") {
                    original.to_string()
                } else {
                    insufficient_funds_explanation()
                }
            }
            FailureKind::AlreadyExists => ALREADY_EXISTS_EXPLANATION.to_string(),
            FailureKind::SimulationFailed => SIMULATION_FAILED_EXPLANATION.to_string(),
            FailureKind::ProgramError => {
                format!("Program error: {original}. Check the console for details.")
            }
            FailureKind::Unclassified => original.to_string(),
        }
    }

    /// Map a structured transaction error onto a category.
    ///
    /// System program custom codes surface through the journal instruction
    /// when account creation fails inside it: 0 is `AccountAlreadyInUse`,
    /// 1 is `ResultWithNegativeLamports`.
    pub fn from_transaction_error(err: &TransactionError) -> Option<Self> {
        match err {
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. } => {
                Some(FailureKind::InsufficientFunds)
            }
            TransactionError::InstructionError(_, InstructionError::Custom(0)) => {
                Some(FailureKind::AlreadyExists)
            }
            TransactionError::InstructionError(_, InstructionError::Custom(1))
            | TransactionError::InstructionError(_, InstructionError::InsufficientFunds) => {
                Some(FailureKind::InsufficientFunds)
            }
            TransactionError::InstructionError(_, InstructionError::Custom(_)) => {
                Some(FailureKind::ProgramError)
            }
            _ => None,
        }
    }
}

// =============================================================================
// CLASSIFIERS
// =============================================================================

/// Classify a submission failure, preferring its structured kind.
pub fn classify_submit_error(err: &SubmitError) -> Classified {
    match err.kind {
        Some(kind) => Classified {
            kind,
            message: kind.describe(&err.message),
        },
        None => classify_message(&err.message),
    }
}

/// Classify a failure by its message text alone.
pub fn classify_message(message: &str) -> Classified {
    let kind = match_kind(message);
    Classified {
        kind,
        message: kind.describe(message),
    }
}

fn match_kind(message: &str) -> FailureKind {
    if message.contains("Insufficient funds") {
        return FailureKind::InsufficientFunds;
    }

    let lower = message.to_lowercase();

    if lower.contains("insufficient lamports")
        || lower.contains("insufficient funds for rent")
        || lower.contains("insufficient funds for fee")
        || lower.contains("insufficientfundsforrent")
        || has_custom_error_code(&lower, "0x1")
    {
        return FailureKind::InsufficientFunds;
    }

    if lower.contains("already in use") {
        return FailureKind::AlreadyExists;
    }

    if lower.contains("simulation failed") || lower.contains("reverted") {
        return FailureKind::SimulationFailed;
    }

    if lower.contains("custom program error")
        || lower.contains("program error")
        || lower.contains("anchorerror")
    {
        return FailureKind::ProgramError;
    }

    FailureKind::Unclassified
}

/// `custom program error: <code>` with nothing hex-like after the code,
/// so `0x1` does not match `0x10` or `0x1770`.
fn has_custom_error_code(lower: &str, code: &str) -> bool {
    let needle = format!("custom program error: {code}");
    lower.match_indices(&needle).any(|(start, _)| {
        lower[start + needle.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_ascii_hexdigit())
    })
}
