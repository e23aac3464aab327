//! Journal Client
//!
//! Ties a connection, a wallet and a notifier to the journal program on the
//! active cluster. Reads go through [`QueryCache`]s keyed by cluster (and
//! address / wallet), so switching clusters never serves another cluster's
//! data. Mutations live in [`crate::mutation`].
//!
//! # Cached Queries
//!
//! | Query | Key | Refetched after |
//! |-------|-----|-----------------|
//! | all entries | cluster | create, update, delete |
//! | one entry | (cluster, address) | cluster switch |
//! | wallet balance | (endpoint, wallet) | create |
//! | program account | cluster | cluster switch |

use crate::cluster::Cluster;
use crate::error::{JournalError, JournalResult};
use crate::mutation::MutationTracker;
use crate::notify::{LogNotifier, Notifier};
use crate::program::{JournalProgram, ProgramAccessor, ProviderIdentity};
use crate::query::QueryCache;
use crate::rpc::{RpcConnection, Wallet};
use crate::state::JournalEntryState;
use parking_lot::RwLock;
use solana_sdk::{account::Account, pubkey::Pubkey};
use std::sync::Arc;
use tracing::{info, warn};

/// A decoded entry and the address it lives at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRecord {
    pub address: Pubkey,
    pub state: JournalEntryState,
}

struct Session {
    cluster: Cluster,
    connection: Arc<dyn RpcConnection>,
}

/// Client for the journal program.
pub struct JournalClient {
    session: RwLock<Session>,
    pub(crate) wallet: Arc<Wallet>,
    pub(crate) notifier: Arc<dyn Notifier>,
    accessor: ProgramAccessor,
    entries: QueryCache<Cluster, Vec<EntryRecord>>,
    entry: QueryCache<(Cluster, Pubkey), JournalEntryState>,
    balance: QueryCache<(String, Pubkey), u64>,
    program_account: QueryCache<Cluster, Option<Account>>,
    pub(crate) mutations: MutationTracker,
}

impl JournalClient {
    pub fn new(cluster: Cluster, connection: Arc<dyn RpcConnection>, wallet: Arc<Wallet>) -> Self {
        Self {
            session: RwLock::new(Session {
                cluster,
                connection,
            }),
            wallet,
            notifier: Arc::new(LogNotifier),
            accessor: ProgramAccessor::new(),
            entries: QueryCache::new("entries"),
            entry: QueryCache::new("entry"),
            balance: QueryCache::new("balance"),
            program_account: QueryCache::new("program-account"),
            mutations: MutationTracker::default(),
        }
    }

    /// Replace the notification sink.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    pub fn cluster(&self) -> Cluster {
        self.session.read().cluster.clone()
    }

    pub fn connection(&self) -> Arc<dyn RpcConnection> {
        Arc::clone(&self.session.read().connection)
    }

    pub fn wallet_pubkey(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    fn provider_identity(&self) -> ProviderIdentity {
        ProviderIdentity {
            endpoint: self.connection().endpoint(),
            wallet: self.wallet_pubkey(),
        }
    }

    /// Program handle for the active cluster and provider.
    pub fn program(&self) -> Arc<JournalProgram> {
        self.accessor.get(&self.cluster(), &self.provider_identity())
    }

    /// Switch to another cluster. Every cached query is marked for refetch.
    pub fn switch_cluster(&self, cluster: Cluster, connection: Arc<dyn RpcConnection>) {
        info!(from = %self.cluster(), to = %cluster, "switching cluster");
        {
            let mut session = self.session.write();
            session.cluster = cluster;
            session.connection = connection;
        }
        self.entries.invalidate_all();
        self.entry.invalidate_all();
        self.balance.invalidate_all();
        self.program_account.invalidate_all();
    }

    // =========================================================================
    // ENTRY QUERIES
    // =========================================================================

    /// Every journal entry of the program, in RPC order.
    ///
    /// Accounts that carry the entry discriminator but fail to decode are
    /// skipped.
    pub async fn list_entries(&self) -> JournalResult<Vec<EntryRecord>> {
        let connection = self.connection();
        let program = self.program();

        self.entries
            .fetch_with(self.cluster(), move || async move {
                let accounts = connection
                    .get_program_accounts(&program.program_id(), &program.entry_discriminator())
                    .await?;

                let mut records = Vec::with_capacity(accounts.len());
                for (address, account) in accounts {
                    match program.decode_entry(&address, &account) {
                        Ok(state) => records.push(EntryRecord { address, state }),
                        Err(err) => warn!(%address, error = %err, "skipping undecodable entry"),
                    }
                }
                Ok(records)
            })
            .await
    }

    /// Mark the entry list for refetch and load it again.
    pub async fn refetch_entries(&self) -> JournalResult<Vec<EntryRecord>> {
        self.entries.invalidate(&self.cluster());
        self.list_entries().await
    }

    /// How many times the entry list of the active cluster was marked for
    /// refetch.
    pub fn entries_invalidations(&self) -> u64 {
        self.entries.invalidations(&self.cluster())
    }

    /// The entry stored at `address`.
    pub async fn fetch_entry(&self, address: &Pubkey) -> JournalResult<JournalEntryState> {
        let connection = self.connection();
        let program = self.program();
        let address = *address;

        self.entry
            .fetch_with((self.cluster(), address), move || async move {
                let account = connection
                    .get_account(&address)
                    .await?
                    .ok_or(JournalError::AccountNotFound(address))?;
                program.decode_entry(&address, &account)
            })
            .await
    }

    /// Mark the cached entry at `address` for refetch.
    pub(crate) fn invalidate_entry(&self, address: &Pubkey) {
        self.entry.invalidate(&(self.cluster(), *address));
    }

    /// The entry `(title, owner)` if it exists. A title that cannot be an
    /// address seed is an `InvalidTitle` error.
    pub async fn find_entry(
        &self,
        title: &str,
        owner: &Pubkey,
    ) -> JournalResult<Option<JournalEntryState>> {
        let (address, _) = self.program().entry_address(title, owner)?;
        match self.fetch_entry(&address).await {
            Ok(entry) => Ok(Some(entry)),
            Err(JournalError::AccountNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // WALLET / PROGRAM QUERIES
    // =========================================================================

    fn balance_key(&self) -> (String, Pubkey) {
        (self.connection().endpoint(), self.wallet_pubkey())
    }

    /// Wallet balance in lamports.
    pub async fn balance(&self) -> JournalResult<u64> {
        let connection = self.connection();
        let wallet = self.wallet_pubkey();
        self.balance
            .fetch_with(self.balance_key(), move || async move {
                connection.get_balance(&wallet).await
            })
            .await
    }

    /// Last fetched wallet balance, if any.
    pub fn cached_balance(&self) -> Option<u64> {
        self.balance.peek(&self.balance_key())
    }

    /// Mark the balance for refetch and load it again.
    pub async fn refetch_balance(&self) -> JournalResult<u64> {
        self.balance.invalidate(&self.balance_key());
        self.balance().await
    }

    pub fn balance_invalidations(&self) -> u64 {
        self.balance.invalidations(&self.balance_key())
    }

    /// Account info at the program id (`None` when not deployed).
    pub async fn program_account(&self) -> JournalResult<Option<Account>> {
        let connection = self.connection();
        let program_id = self.program().program_id();
        self.program_account
            .fetch_with(self.cluster(), move || async move {
                connection.get_account(&program_id).await
            })
            .await
    }
}
