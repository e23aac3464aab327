//! In-Process Ledger
//!
//! A [`RpcConnection`] that keeps balances and accounts in memory and applies
//! journal instructions the way the on-chain program does: entries live at
//! the `[title, owner]` PDA, creation charges rent, a second create for the
//! same title fails with the system program's "already in use", deletion
//! refunds rent. Failures are reported in the same text format as a
//! JSON-RPC preflight failure.
//!
//! Used by the test suites; it can also back a local demo without a node.

use crate::error::{JournalError, JournalResult, SubmitError};
use crate::instruction::JournalInstruction;
use crate::rpc::{sign_transaction, RpcConnection, Wallet};
use crate::state::JournalEntryState;
use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::{
    account::Account, hash::Hash, instruction::Instruction, pubkey::Pubkey, rent::Rent,
    signature::Signature,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Flat fee charged per transaction.
pub const SIGNATURE_FEE: u64 = 5_000;

#[derive(Default)]
struct LedgerState {
    balances: BTreeMap<Pubkey, u64>,
    accounts: BTreeMap<Pubkey, Account>,
    scripted_failures: VecDeque<SubmitError>,
}

/// In-memory stand-in for a Solana node running the journal program.
pub struct MemoryLedger {
    endpoint: String,
    program_id: Pubkey,
    state: Mutex<LedgerState>,
    submissions: AtomicUsize,
}

impl MemoryLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self::with_endpoint("memory://ledger", program_id)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, program_id: Pubkey) -> Self {
        Self {
            endpoint: endpoint.into(),
            program_id,
            state: Mutex::new(LedgerState::default()),
            submissions: AtomicUsize::new(0),
        }
    }

    /// Credit lamports to a wallet.
    pub fn airdrop(&self, address: &Pubkey, lamports: u64) {
        *self.state.lock().balances.entry(*address).or_insert(0) += lamports;
    }

    /// Store an arbitrary account.
    pub fn insert_account(&self, address: Pubkey, account: Account) {
        self.state.lock().accounts.insert(address, account);
    }

    /// Make the next submission fail with `err` without touching state.
    pub fn fail_next(&self, err: SubmitError) {
        self.state.lock().scripted_failures.push_back(err);
    }

    /// Number of `send_transaction` calls so far.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    fn rent_for_entry() -> u64 {
        Rent::default().minimum_balance(JournalEntryState::LEN)
    }

    fn apply(
        &self,
        state: &mut LedgerState,
        instruction: &Instruction,
        payer: &Pubkey,
    ) -> Result<(), SubmitError> {
        if instruction.program_id != self.program_id {
            return Err(simulation_failure(
                "Attempt to load a program that does not exist",
                Vec::new(),
            ));
        }

        let parsed = JournalInstruction::unpack(&instruction.data)
            .map_err(|_| program_failure(0x65, "InstructionFallbackNotFound"))?;

        let (entry_meta, owner_meta) = match instruction.accounts.as_slice() {
            [entry, owner, ..] => (entry, owner),
            _ => return Err(program_failure(0xbbd, "AccountNotEnoughKeys")),
        };
        if owner_meta.pubkey != *payer || !owner_meta.is_signer {
            return Err(simulation_failure(
                "missing required signature for instruction",
                Vec::new(),
            ));
        }
        let owner = owner_meta.pubkey;

        let (expected, _bump) = Pubkey::try_find_program_address(
            &[parsed.title().as_bytes(), owner.as_ref()],
            &self.program_id,
        )
        .ok_or_else(|| program_failure(0x7d6, "ConstraintSeeds"))?;
        if entry_meta.pubkey != expected {
            return Err(program_failure(0x7d6, "ConstraintSeeds"));
        }

        let balance = state.balances.get(&owner).copied().unwrap_or(0);
        if balance < SIGNATURE_FEE {
            return Err(SubmitError::new(
                "RPC response error -32002: Transaction simulation failed: \
                 Attempt to debit an account but found no record of a prior credit.",
            ));
        }
        let balance = balance - SIGNATURE_FEE;

        match parsed {
            JournalInstruction::CreateJournalEntry { title, message } => {
                if state.accounts.contains_key(&expected) {
                    return Err(simulation_failure(
                        "custom program error: 0x0",
                        vec![
                            format!("Program {} invoke [1]", self.program_id),
                            "Program log: Instruction: CreateJournalEntry".to_string(),
                            "Program 11111111111111111111111111111111 invoke [2]".to_string(),
                            format!(
                                "Allocate: account Address {{ address: {expected}, base: None }} already in use"
                            ),
                            "Program 11111111111111111111111111111111 failed: custom program error: 0x0"
                                .to_string(),
                        ],
                    ));
                }

                let rent = Self::rent_for_entry();
                if balance < rent {
                    return Err(simulation_failure(
                        "custom program error: 0x1",
                        vec![
                            "Program 11111111111111111111111111111111 invoke [2]".to_string(),
                            format!("Transfer: insufficient lamports {balance}, need {rent}"),
                            "Program 11111111111111111111111111111111 failed: custom program error: 0x1"
                                .to_string(),
                        ],
                    ));
                }

                let data = JournalEntryState {
                    owner,
                    title,
                    message,
                }
                .pack()
                .map_err(|_| program_failure(0xbc2, "AccountDidNotSerialize"))?;

                state.balances.insert(owner, balance - rent);
                state.accounts.insert(
                    expected,
                    Account {
                        lamports: rent,
                        data,
                        owner: self.program_id,
                        executable: false,
                        rent_epoch: 0,
                    },
                );
            }

            JournalInstruction::UpdateJournalEntry { message, .. } => {
                let account = state
                    .accounts
                    .get_mut(&expected)
                    .ok_or_else(|| program_failure(0xbc4, "AccountNotInitialized"))?;
                let mut entry = JournalEntryState::unpack(&account.data)
                    .map_err(|_| program_failure(0xbbb, "AccountDidNotDeserialize"))?;
                entry.message = message;
                account.data = entry
                    .pack()
                    .map_err(|_| program_failure(0xbc2, "AccountDidNotSerialize"))?;
                state.balances.insert(owner, balance);
            }

            JournalInstruction::DeleteJournalEntry { .. } => {
                let account = state
                    .accounts
                    .remove(&expected)
                    .ok_or_else(|| program_failure(0xbc4, "AccountNotInitialized"))?;
                state.balances.insert(owner, balance + account.lamports);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RpcConnection for MemoryLedger {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn get_balance(&self, address: &Pubkey) -> JournalResult<u64> {
        Ok(self.state.lock().balances.get(address).copied().unwrap_or(0))
    }

    async fn get_account(&self, address: &Pubkey) -> JournalResult<Option<Account>> {
        Ok(self.state.lock().accounts.get(address).cloned())
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: &[u8; 8],
    ) -> JournalResult<Vec<(Pubkey, Account)>> {
        if *program_id != self.program_id {
            return Err(JournalError::Rpc(format!("unknown program {program_id}")));
        }
        Ok(self
            .state
            .lock()
            .accounts
            .iter()
            .filter(|(_, account)| {
                account.owner == *program_id && account.data.starts_with(discriminator)
            })
            .map(|(address, account)| (*address, account.clone()))
            .collect())
    }

    async fn send_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Wallet,
    ) -> Result<Signature, SubmitError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        if let Some(err) = state.scripted_failures.pop_front() {
            return Err(err);
        }

        let transaction = sign_transaction(instructions, payer, Hash::default())?;
        let payer_key = payer.pubkey();

        // Apply against a copy so a failing instruction leaves no trace.
        let mut staged = LedgerState {
            balances: state.balances.clone(),
            accounts: state.accounts.clone(),
            scripted_failures: VecDeque::new(),
        };
        for instruction in instructions {
            self.apply(&mut staged, instruction, &payer_key)?;
        }
        state.balances = staged.balances;
        state.accounts = staged.accounts;

        Ok(transaction.signatures[0])
    }
}

/// Error text in the shape `solana-client` renders a preflight failure.
fn simulation_failure(detail: &str, logs: Vec<String>) -> SubmitError {
    let mut message = format!(
        "RPC response error -32002: Transaction simulation failed: \
         Error processing Instruction 0: {detail}"
    );
    if !logs.is_empty() {
        message.push_str(&format!("; {} log messages:", logs.len()));
        for line in &logs {
            message.push_str("\n  ");
            message.push_str(line);
        }
    }
    SubmitError::new(message).with_logs(logs)
}

/// Failure raised by the journal program itself.
fn program_failure(code: u32, name: &str) -> SubmitError {
    simulation_failure(
        &format!("custom program error: {code:#x}"),
        vec![format!("Program log: AnchorError occurred. Error Code: {name}.")],
    )
}
