//! Journal Entry Account State
//!
//! A journal entry is one account per `(title, owner)` pair, created by the
//! program at the address derived from those seeds.
//!
//! # Memory Layout (1098 bytes allocated)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Offset │ Size     │ Field         │ Type                    │
//! ├────────┼──────────┼───────────────┼─────────────────────────┤
//! │ 0      │ 8        │ discriminator │ sha256("account:...")   │
//! │ 8      │ 32       │ owner         │ Pubkey                  │
//! │ 40     │ 4 + ≤50  │ title         │ u32 LE len + UTF-8      │
//! │ ...    │ 4 + ≤1000│ message       │ u32 LE len + UTF-8      │
//! │ ...    │ rest     │ padding       │ zeros                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::instruction::{read_string, write_string};
use arrayref::{array_ref, array_refs};
use solana_program::{hash::hash, program_error::ProgramError, pubkey::Pubkey};

// =============================================================================
// SIZES
// =============================================================================

/// Space reserved for the title in the account. Usable titles are shorter:
/// the title seeds the entry PDA, and seeds are capped at 32 bytes.
pub const MAX_TITLE_LEN: usize = 50;

/// Maximum message length in bytes.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Account type name hashed into the discriminator.
pub const ACCOUNT_NAME: &str = "JournalEntryState";

/// Discriminator at the start of every journal entry account.
pub fn account_discriminator() -> [u8; 8] {
    let digest = hash(format!("account:{ACCOUNT_NAME}").as_bytes()).to_bytes();
    *array_ref![digest, 0, 8]
}

// =============================================================================
// JOURNAL ENTRY STATE
// =============================================================================

/// Decoded journal entry account.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct JournalEntryState {
    /// Wallet that created the entry and signs updates/deletes
    #[serde(serialize_with = "serialize_pubkey")]
    pub owner: Pubkey,

    /// Logical key, unique per owner
    pub title: String,

    pub message: String,
}

impl JournalEntryState {
    /// Space the program reserves, excluding the discriminator.
    pub const INIT_SPACE: usize = 32 + 4 + MAX_TITLE_LEN + 4 + MAX_MESSAGE_LEN;

    /// Allocated account size.
    pub const LEN: usize = 8 + Self::INIT_SPACE;

    /// Header: discriminator + owner.
    const HEADER_LEN: usize = 8 + 32;

    /// Decode account data.
    ///
    /// Trailing zero padding is ignored.
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        if input.len() < Self::HEADER_LEN {
            return Err(ProgramError::AccountDataTooSmall);
        }

        let header = array_ref![input, 0, 40];
        let (discriminator, owner) = array_refs![header, 8, 32];
        if *discriminator != account_discriminator() {
            return Err(ProgramError::InvalidAccountData);
        }

        let body = &input[Self::HEADER_LEN..];
        let (title, body) = read_string(body).map_err(|_| ProgramError::InvalidAccountData)?;
        let (message, _) = read_string(body).map_err(|_| ProgramError::InvalidAccountData)?;

        Ok(JournalEntryState {
            owner: Pubkey::new_from_array(*owner),
            title,
            message,
        })
    }

    /// Encode into a zero-padded buffer of [`Self::LEN`] bytes.
    ///
    /// Fails when the title or message exceed their maximum lengths.
    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        if self.title.len() > MAX_TITLE_LEN || self.message.len() > MAX_MESSAGE_LEN {
            return Err(ProgramError::InvalidArgument);
        }

        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(&account_discriminator());
        buf.extend_from_slice(self.owner.as_ref());
        write_string(&mut buf, &self.title);
        write_string(&mut buf, &self.message);
        buf.resize(Self::LEN, 0);
        Ok(buf)
    }
}

fn serialize_pubkey<S: serde::Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&key.to_string())
}
