//! Entry Mutations
//!
//! Create, update and delete submit one transaction each through the active
//! connection.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──submit──> Pending ──ok──> Succeeded(signature)
//!                          └─err─> Failed(message)
//! ```
//!
//! Nothing deduplicates or queues submissions: a second create while one is
//! pending races the first at the RPC layer.
//!
//! # Side Effects
//!
//! | Outcome | create | update | delete |
//! |---------|--------|--------|--------|
//! | success | notify, refetch entries, refetch balance | notify, refetch entries | notify, refetch entries |
//! | failure | log, classify, notify error | log, notify error | log, notify error |

use crate::classify::{classify_submit_error, FailureKind};
use crate::client::JournalClient;
use crate::error::{JournalError, JournalResult, SubmitError};
use crate::guard::check_create_balance;
use parking_lot::Mutex;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature};
use std::collections::HashMap;
use tracing::{error, info, warn};

// =============================================================================
// ARGUMENTS AND STATUS
// =============================================================================

/// Arguments of create and update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateEntryArgs {
    pub title: String,
    pub message: String,
    pub owner: Pubkey,
}

impl CreateEntryArgs {
    pub fn new(title: impl Into<String>, message: impl Into<String>, owner: Pubkey) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            owner,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    /// Verb used in error notifications ("Error creating entry: ...").
    fn verb(self) -> &'static str {
        match self {
            MutationKind::Create => "creating",
            MutationKind::Update => "updating",
            MutationKind::Delete => "deleting",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Succeeded(Signature),
    Failed(String),
}

/// Latest status per mutation kind.
#[derive(Debug, Default)]
pub struct MutationTracker {
    states: Mutex<HashMap<MutationKind, MutationStatus>>,
}

impl MutationTracker {
    pub fn status(&self, kind: MutationKind) -> MutationStatus {
        self.states
            .lock()
            .get(&kind)
            .cloned()
            .unwrap_or(MutationStatus::Idle)
    }

    fn set(&self, kind: MutationKind, status: MutationStatus) {
        self.states.lock().insert(kind, status);
    }
}

// =============================================================================
// MUTATIONS
// =============================================================================

impl JournalClient {
    /// Latest lifecycle state of a mutation kind.
    pub fn mutation_status(&self, kind: MutationKind) -> MutationStatus {
        self.mutations.status(kind)
    }

    /// Create the entry `(title, owner)`.
    ///
    /// The cached wallet balance must cover the create threshold; an
    /// unfetched balance counts as zero.
    pub async fn create_entry(&self, args: &CreateEntryArgs) -> JournalResult<Signature> {
        let kind = MutationKind::Create;
        self.mutations.set(kind, MutationStatus::Pending);

        let outcome: JournalResult<Signature> = async {
            check_create_balance(self.cached_balance())?;

            let program = self.program();
            let ix = program.create_journal_entry(&args.title, &args.message, &args.owner)?;
            self.submit(kind, &args.title, ix).await.map_err(|err| {
                let classified = classify_submit_error(&err);
                JournalError::Transaction {
                    kind: classified.kind,
                    message: classified.message,
                }
            })
        }
        .await;

        let signature = self.settle(kind, outcome)?;
        self.after_success(&args.title, &args.owner).await;
        if let Err(err) = self.refetch_balance().await {
            warn!(error = %err, "balance refetch after create failed");
        }
        Ok(signature)
    }

    /// Replace the message of the entry `(title, owner)`.
    pub async fn update_entry(&self, args: &CreateEntryArgs) -> JournalResult<Signature> {
        let kind = MutationKind::Update;
        self.mutations.set(kind, MutationStatus::Pending);

        let built = self
            .program()
            .update_journal_entry(&args.title, &args.message, &args.owner);
        let outcome = match built {
            Ok(ix) => self.submit(kind, &args.title, ix).await.map_err(passthrough),
            Err(err) => Err(err),
        };

        let signature = self.settle(kind, outcome)?;
        self.after_success(&args.title, &args.owner).await;
        Ok(signature)
    }

    /// Delete the wallet's entry titled `title`.
    pub async fn delete_entry(&self, title: &str) -> JournalResult<Signature> {
        let kind = MutationKind::Delete;
        self.mutations.set(kind, MutationStatus::Pending);

        let owner = self.wallet_pubkey();
        let built = self.program().delete_journal_entry(title, &owner);
        let outcome = match built {
            Ok(ix) => self.submit(kind, title, ix).await.map_err(passthrough),
            Err(err) => Err(err),
        };

        let signature = self.settle(kind, outcome)?;
        self.after_success(title, &owner).await;
        Ok(signature)
    }

    // =========================================================================
    // SHARED STEPS
    // =========================================================================

    async fn submit(
        &self,
        kind: MutationKind,
        title: &str,
        ix: Instruction,
    ) -> Result<Signature, SubmitError> {
        info!(?kind, title, "submitting journal transaction");
        let result = self
            .connection()
            .send_transaction(&[ix], &*self.wallet)
            .await;

        if let Err(err) = &result {
            for line in &err.logs {
                error!(target: "journal_client::program_logs", "{line}");
            }
            error!(?kind, error = ?err, "transaction submission failed");
        }
        result
    }

    /// Record the outcome and surface failures.
    fn settle(
        &self,
        kind: MutationKind,
        outcome: JournalResult<Signature>,
    ) -> JournalResult<Signature> {
        match outcome {
            Ok(signature) => {
                self.mutations.set(kind, MutationStatus::Succeeded(signature));
                let url = self.cluster().explorer_url(&format!("tx/{signature}"));
                self.notifier.transaction_sent(&signature, &url);
                Ok(signature)
            }
            Err(err) => {
                error!(?kind, error = ?err, "mutation failed");
                let text = format!("Error {} entry: {err}", kind.verb());
                self.notifier.error(&text);
                self.mutations.set(kind, MutationStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    async fn after_success(&self, title: &str, owner: &Pubkey) {
        match self.program().entry_address(title, owner) {
            Ok((address, _)) => self.invalidate_entry(&address),
            Err(err) => warn!(error = %err, "entry address unavailable"),
        }
        if let Err(err) = self.refetch_entries().await {
            warn!(error = %err, "entry list refetch failed");
        }
    }
}

/// Update and delete show the RPC message as is.
fn passthrough(err: SubmitError) -> JournalError {
    JournalError::Transaction {
        kind: err.kind.unwrap_or(FailureKind::Unclassified),
        message: err.message,
    }
}
