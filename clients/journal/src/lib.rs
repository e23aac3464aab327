//! # Journal Client
//!
//! Client for an on-chain journal program: each entry is a program account
//! holding `(owner, title, message)`, addressed by the PDA of
//! `[title, owner]`.
//!
//! ## Overview
//!
//! This crate allows you to:
//! - Resolve the program for the active cluster
//! - List every entry, or read one by address
//! - Create, update and delete entries signed by a local wallet
//! - Refuse a create when the wallet balance is too low
//! - Turn raw RPC failures into messages a person can act on
//! - Serve a small web front-end with a Content-Security-Policy header
//!
//! ## Account Layout
//!
//! | Field | Size | Description |
//! |-------|------|-------------|
//! | discriminator | 8 bytes | `sha256("account:JournalEntryState")[..8]` |
//! | owner | 32 bytes | Wallet that created the entry |
//! | title | 4 + 50 bytes | Length-prefixed UTF-8 |
//! | message | 4 + 1000 bytes | Length-prefixed UTF-8 |
//!
//! ## Instructions
//!
//! | Method | Accounts | Arguments |
//! |--------|----------|-----------|
//! | create_journal_entry | entry (w), owner (w, s), system program | title, message |
//! | update_journal_entry | entry (w), owner (w, s), system program | title, message |
//! | delete_journal_entry | entry (w), owner (w, s), system program | title |

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Failure classification and user-facing explanations
pub mod classify;

/// Cached entry and wallet queries
pub mod client;

/// Cluster selection, endpoints and explorer links
pub mod cluster;

/// Client configuration
pub mod config;

/// Error types
pub mod error;

/// Minimum-balance check for creates
pub mod guard;

/// Instruction encoding
pub mod instruction;

/// In-process ledger
pub mod ledger;

/// Tracing setup
pub mod logging;

/// HTTP middleware (CSP header)
pub mod middleware;

/// Create / update / delete
pub mod mutation;

/// User notifications
pub mod notify;

/// Program handle and its memoized accessor
pub mod program;

/// Keyed query cache
pub mod query;

/// RPC connection boundary
pub mod rpc;

/// Web front-end
pub mod server;

/// Entry account layout
pub mod state;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use classify::{classify_message, classify_submit_error, Classified, FailureKind};
pub use client::{EntryRecord, JournalClient};
pub use cluster::Cluster;
pub use config::ClientConfig;
pub use error::{JournalError, JournalResult, SubmitError};
pub use ledger::MemoryLedger;
pub use mutation::{CreateEntryArgs, MutationKind, MutationStatus};
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier};
pub use program::JournalProgram;
pub use rpc::{RpcConnection, SolanaRpc, Wallet};
pub use state::JournalEntryState;

// =============================================================================
// PROGRAM ID
// =============================================================================

// Program address on localnet and any custom cluster. Devnet and testnet use
// `cluster::DEVNET_PROGRAM_ID`.
solana_program::declare_id!("CNZneaN4To4pfF4gHMGGpFfxyWmztQjTGngcRx6Lbsn4");
