//! RPC Connection Boundary
//!
//! The client reads accounts and submits transactions only through
//! [`RpcConnection`]. Two implementations exist:
//!
//! - [`SolanaRpc`]: a JSON-RPC node through `solana-client`
//! - [`crate::ledger::MemoryLedger`]: an in-process ledger for tests
//!
//! Submission signs the message with the wallet and maps failures into
//! [`SubmitError`], keeping the simulation logs.

use crate::classify::FailureKind;
use crate::error::{JournalError, JournalResult, SubmitError};
use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
    rpc_request::{RpcError, RpcResponseErrorData},
};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signature::Signature,
    signer::Signer,
    transaction::Transaction,
};
use tracing::debug;

/// Wallet handle shared between the client and its connections.
pub type Wallet = dyn Signer + Send + Sync;

// =============================================================================
// CONNECTION TRAIT
// =============================================================================

/// Everything the journal client needs from a Solana node.
#[async_trait]
pub trait RpcConnection: Send + Sync {
    /// Endpoint URL, used as part of cache keys.
    fn endpoint(&self) -> String;

    /// Lamport balance of an address.
    async fn get_balance(&self, address: &Pubkey) -> JournalResult<u64>;

    /// Account at an address, `None` when it does not exist.
    async fn get_account(&self, address: &Pubkey) -> JournalResult<Option<Account>>;

    /// Accounts owned by `program_id` whose data starts with `discriminator`.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: &[u8; 8],
    ) -> JournalResult<Vec<(Pubkey, Account)>>;

    /// Sign with `payer` and submit; resolves once the transaction is
    /// confirmed.
    async fn send_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Wallet,
    ) -> Result<Signature, SubmitError>;
}

/// Build and sign a single-signer transaction.
pub fn sign_transaction(
    instructions: &[Instruction],
    payer: &Wallet,
    recent_blockhash: Hash,
) -> Result<Transaction, SubmitError> {
    let mut message = Message::new(instructions, Some(&payer.pubkey()));
    message.recent_blockhash = recent_blockhash;

    let signature = payer
        .try_sign_message(&message.serialize())
        .map_err(|e| SubmitError::new(format!("Failed to sign transaction: {e}")))?;

    Ok(Transaction {
        signatures: vec![signature],
        message,
    })
}

// =============================================================================
// SOLANA JSON-RPC CONNECTION
// =============================================================================

/// Connection to a Solana JSON-RPC node.
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), commitment),
        }
    }
}

#[async_trait]
impl RpcConnection for SolanaRpc {
    fn endpoint(&self) -> String {
        self.client.url()
    }

    async fn get_balance(&self, address: &Pubkey) -> JournalResult<u64> {
        self.client
            .get_balance(address)
            .await
            .map_err(|e| JournalError::Rpc(e.to_string()))
    }

    async fn get_account(&self, address: &Pubkey) -> JournalResult<Option<Account>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await
            .map_err(|e| JournalError::Rpc(e.to_string()))?;
        Ok(response.value)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: &[u8; 8],
    ) -> JournalResult<Vec<(Pubkey, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                0,
                discriminator,
            ))]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        self.client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(|e| JournalError::Rpc(e.to_string()))
    }

    async fn send_transaction(
        &self,
        instructions: &[Instruction],
        payer: &Wallet,
    ) -> Result<Signature, SubmitError> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(submit_error)?;
        let transaction = sign_transaction(instructions, payer, blockhash)?;

        debug!(payer = %payer.pubkey(), "sending transaction");
        self.client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(submit_error)
    }
}

/// Map a client error, keeping preflight simulation logs and any
/// structured transaction error.
fn submit_error(err: ClientError) -> SubmitError {
    let logs = match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(result),
            ..
        }) => result.logs.clone().unwrap_or_default(),
        _ => Vec::new(),
    };
    let kind = err
        .get_transaction_error()
        .and_then(|e| FailureKind::from_transaction_error(&e));

    let mapped = SubmitError::new(err.to_string()).with_logs(logs);
    match kind {
        Some(kind) => mapped.with_kind(kind),
        None => mapped,
    }
}
