//! Balance Guard
//!
//! Client-side estimate run before a create transaction is built. The
//! authoritative check is the program's own rent/fee enforcement; a create
//! that passes here can still be rejected on chain.

use crate::error::{JournalError, JournalResult};
use solana_sdk::native_token::lamports_to_sol;

/// Minimum balance to create an entry: rent for the entry account plus fee.
pub const MIN_CREATE_BALANCE: u64 = 3_000_000;

/// [`MIN_CREATE_BALANCE`] in SOL.
pub const MIN_CREATE_BALANCE_SOL: f64 = 0.003;

/// Reject a create when `balance` is below [`MIN_CREATE_BALANCE`].
///
/// An unknown balance (`None`) counts as 0, so a wallet whose balance was
/// never fetched is blocked.
pub fn check_create_balance(balance: Option<u64>) -> JournalResult<()> {
    let balance = balance.unwrap_or(0);
    if balance >= MIN_CREATE_BALANCE {
        return Ok(());
    }

    let shortfall = MIN_CREATE_BALANCE - balance;
    Err(JournalError::InsufficientBalance {
        balance,
        minimum_sol: MIN_CREATE_BALANCE_SOL,
        shortfall_sol: lamports_to_sol(shortfall),
    })
}
