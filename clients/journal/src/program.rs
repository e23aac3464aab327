//! Program Client Accessor
//!
//! [`JournalProgram`] is the typed handle to the on-chain program: it derives
//! entry addresses, builds the three instructions and decodes entry
//! accounts. [`ProgramAccessor`] memoizes the handle on the active cluster
//! and provider identity.

use crate::cluster::Cluster;
use crate::error::{JournalError, JournalResult};
use crate::instruction::JournalInstruction;
use crate::state::{account_discriminator, JournalEntryState};
use parking_lot::Mutex;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use solana_sdk::account::Account;
use std::sync::Arc;
use tracing::debug;

// =============================================================================
// PROGRAM HANDLE
// =============================================================================

/// Typed handle to the journal program at one address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JournalProgram {
    program_id: Pubkey,
}

impl JournalProgram {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id
    }

    /// Address of the entry `(title, owner)`: PDA of `[title, owner]`.
    ///
    /// Fails with `InvalidTitle` when the title is longer than a seed may be.
    pub fn entry_address(&self, title: &str, owner: &Pubkey) -> JournalResult<(Pubkey, u8)> {
        Pubkey::try_find_program_address(&[title.as_bytes(), owner.as_ref()], &self.program_id)
            .ok_or_else(|| JournalError::InvalidTitle {
                title: title.to_string(),
            })
    }

    /// `create_journal_entry(title, message)` signed by `owner`.
    pub fn create_journal_entry(
        &self,
        title: &str,
        message: &str,
        owner: &Pubkey,
    ) -> JournalResult<Instruction> {
        self.instruction(
            JournalInstruction::CreateJournalEntry {
                title: title.to_string(),
                message: message.to_string(),
            },
            owner,
        )
    }

    /// `update_journal_entry(title, message)` signed by `owner`.
    pub fn update_journal_entry(
        &self,
        title: &str,
        message: &str,
        owner: &Pubkey,
    ) -> JournalResult<Instruction> {
        self.instruction(
            JournalInstruction::UpdateJournalEntry {
                title: title.to_string(),
                message: message.to_string(),
            },
            owner,
        )
    }

    /// `delete_journal_entry(title)` signed by `owner`.
    pub fn delete_journal_entry(&self, title: &str, owner: &Pubkey) -> JournalResult<Instruction> {
        self.instruction(
            JournalInstruction::DeleteJournalEntry {
                title: title.to_string(),
            },
            owner,
        )
    }

    fn instruction(&self, ix: JournalInstruction, owner: &Pubkey) -> JournalResult<Instruction> {
        let (entry, _bump) = self.entry_address(ix.title(), owner)?;
        Ok(Instruction {
            program_id: self.program_id,
            accounts: vec![
                AccountMeta::new(entry, false),
                AccountMeta::new(*owner, true),
                AccountMeta::new_readonly(system_program::id(), false),
            ],
            data: ix.pack(),
        })
    }

    /// Discriminator used to filter entry accounts.
    pub fn entry_discriminator(&self) -> [u8; 8] {
        account_discriminator()
    }

    /// Decode the entry stored in `account` at `address`.
    pub fn decode_entry(&self, address: &Pubkey, account: &Account) -> JournalResult<JournalEntryState> {
        if account.owner != self.program_id {
            return Err(JournalError::Decode {
                address: *address,
                reason: format!("owned by {}, not the journal program", account.owner),
            });
        }
        JournalEntryState::unpack(&account.data).map_err(|e| JournalError::Decode {
            address: *address,
            reason: e.to_string(),
        })
    }
}

// =============================================================================
// MEMOIZED ACCESSOR
// =============================================================================

/// What the program handle depends on besides the cluster.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProviderIdentity {
    pub endpoint: String,
    pub wallet: Pubkey,
}

/// Returns the same [`JournalProgram`] until the cluster or provider changes.
#[derive(Default)]
pub struct ProgramAccessor {
    cached: Mutex<Option<(Cluster, ProviderIdentity, Arc<JournalProgram>)>>,
}

impl ProgramAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cluster: &Cluster, provider: &ProviderIdentity) -> Arc<JournalProgram> {
        let mut cached = self.cached.lock();
        if let Some((c, p, program)) = cached.as_ref() {
            if c == cluster && p == provider {
                return Arc::clone(program);
            }
        }

        let program = Arc::new(JournalProgram::new(cluster.program_id()));
        debug!(%cluster, program_id = %program.program_id(), "resolved journal program");
        *cached = Some((cluster.clone(), provider.clone(), Arc::clone(&program)));
        program
    }
}
