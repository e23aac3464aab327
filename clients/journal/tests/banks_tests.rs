//! Journal client against a `solana-program-test` bank.
//!
//! The bank has no journal program deployed, so entries are seeded as plain
//! accounts owned by the program id. Reads, the balance guard and failure
//! reporting run through a real bank instead of the in-process ledger.

use async_trait::async_trait;
use journal_client::rpc::sign_transaction;
use journal_client::{
    Cluster, CreateEntryArgs, FailureKind, JournalClient, JournalEntryState, JournalError,
    JournalResult, MutationKind, MutationStatus, RpcConnection, SubmitError, Wallet,
};
use solana_program_test::*;
use solana_sdk::{
    account::Account,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::sync::Arc;

// =============================================================================
// TEST SETUP HELPERS
// =============================================================================

/// [`RpcConnection`] over a `BanksClient`.
///
/// Banks has no program-account scan, so the addresses to list are given up
/// front.
struct BanksConnection {
    banks: BanksClient,
    known_accounts: Vec<Pubkey>,
}

fn rpc_error(err: BanksClientError) -> JournalError {
    JournalError::Rpc(err.to_string())
}

#[async_trait]
impl RpcConnection for BanksConnection {
    fn endpoint(&self) -> String {
        "banks://program-test".to_string()
    }

    async fn get_balance(&self, address: &Pubkey) -> JournalResult<u64> {
        let mut banks = self.banks.clone();
        banks.get_balance(*address).await.map_err(rpc_error)
    }

    async fn get_account(&self, address: &Pubkey) -> JournalResult<Option<Account>> {
        let mut banks = self.banks.clone();
        banks.get_account(*address).await.map_err(rpc_error)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: &[u8; 8],
    ) -> JournalResult<Vec<(Pubkey, Account)>> {
        let mut banks = self.banks.clone();
        let mut found = Vec::new();
        for address in &self.known_accounts {
            if let Some(account) = banks.get_account(*address).await.map_err(rpc_error)? {
                if account.owner == *program_id && account.data.starts_with(discriminator) {
                    found.push((*address, account));
                }
            }
        }
        Ok(found)
    }

    async fn send_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Wallet,
    ) -> Result<Signature, SubmitError> {
        let mut banks = self.banks.clone();
        let blockhash = banks
            .get_latest_blockhash()
            .await
            .map_err(|e| SubmitError::new(e.to_string()))?;
        let transaction = sign_transaction(instructions, payer, blockhash)?;
        let signature = transaction.signatures[0];

        banks
            .process_transaction(transaction)
            .await
            .map_err(|err| match err {
                BanksClientError::SimulationError { err, logs, .. } => {
                    let mapped = SubmitError::new(err.to_string()).with_logs(logs);
                    match FailureKind::from_transaction_error(&err) {
                        Some(kind) => mapped.with_kind(kind),
                        None => mapped,
                    }
                }
                other => SubmitError::new(other.to_string()),
            })?;
        Ok(signature)
    }
}

fn entry_account(owner: Pubkey, title: &str, message: &str) -> Account {
    Account {
        lamports: 10_000_000,
        data: JournalEntryState {
            owner,
            title: title.to_string(),
            message: message.to_string(),
        }
        .pack()
        .unwrap(),
        owner: journal_client::id(),
        executable: false,
        rent_epoch: 0,
    }
}

/// Start a bank with `wallet` funded by `lamports` and `entries` seeded at
/// their PDAs.
async fn start(wallet: &Keypair, lamports: u64, entries: &[(&str, &str)]) -> BanksConnection {
    let mut program_test = ProgramTest::default();
    program_test.add_account(
        wallet.pubkey(),
        Account {
            lamports,
            ..Account::default()
        },
    );

    let mut known_accounts = Vec::new();
    for (title, message) in entries {
        let (address, _) = Pubkey::find_program_address(
            &[title.as_bytes(), wallet.pubkey().as_ref()],
            &journal_client::id(),
        );
        program_test.add_account(address, entry_account(wallet.pubkey(), title, message));
        known_accounts.push(address);
    }

    let (banks, _payer, _blockhash) = program_test.start().await;
    BanksConnection {
        banks,
        known_accounts,
    }
}

fn client(connection: BanksConnection, wallet: Keypair) -> JournalClient {
    JournalClient::new(Cluster::Localnet, Arc::new(connection), Arc::new(wallet))
}

// =============================================================================
// READ TESTS
// =============================================================================

#[tokio::test]
async fn test_seeded_entries_are_listed_and_found() {
    let wallet = Keypair::new();
    let owner = wallet.pubkey();
    let connection = start(&wallet, 1_000_000_000, &[("first", "one"), ("second", "two")]).await;
    let client = client(connection, wallet);

    let mut titles: Vec<String> = client
        .list_entries()
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.state.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["first", "second"]);

    let entry = client.find_entry("second", &owner).await.unwrap().unwrap();
    assert_eq!(entry.message, "two");
    assert_eq!(entry.owner, owner);

    assert!(client.find_entry("third", &owner).await.unwrap().is_none());
}

#[tokio::test]
async fn test_balance_from_bank() {
    let wallet = Keypair::new();
    let connection = start(&wallet, 7_000_000, &[]).await;
    let client = client(connection, wallet);

    assert_eq!(client.cached_balance(), None);
    assert_eq!(client.balance().await.unwrap(), 7_000_000);
    assert_eq!(client.cached_balance(), Some(7_000_000));
}

// =============================================================================
// SUBMISSION TESTS
// =============================================================================

#[tokio::test]
async fn test_guard_blocks_underfunded_wallet() {
    let wallet = Keypair::new();
    let owner = wallet.pubkey();
    let connection = start(&wallet, 2_000_000, &[]).await;
    let client = client(connection, wallet);

    client.balance().await.unwrap();
    let err = client
        .create_entry(&CreateEntryArgs::new("title", "message", owner))
        .await
        .unwrap_err();

    match err {
        JournalError::InsufficientBalance {
            balance,
            shortfall_sol,
            ..
        } => {
            assert_eq!(balance, 2_000_000);
            assert!((shortfall_sol - 0.001).abs() < 1e-9);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_submission_is_reported() {
    // The journal program is not deployed in this bank
    let wallet = Keypair::new();
    let owner = wallet.pubkey();
    let connection = start(&wallet, 1_000_000_000, &[]).await;
    let client = client(connection, wallet);

    client.balance().await.unwrap();
    let err = client
        .create_entry(&CreateEntryArgs::new("title", "message", owner))
        .await
        .unwrap_err();

    assert!(matches!(err, JournalError::Transaction { .. }));
    assert!(matches!(
        client.mutation_status(MutationKind::Create),
        MutationStatus::Failed(_)
    ));
    assert!(client.list_entries().await.unwrap().is_empty());
}
