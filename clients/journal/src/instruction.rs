//! Instruction Types
//!
//! This module defines the instructions of the journal program as the
//! client encodes them. Each instruction has:
//! - An 8-byte discriminator (first 8 bytes of `sha256("global:<method>")`)
//! - Length-prefixed string arguments
//! - Expected accounts (documented, built by [`crate::program::JournalProgram`])
//!
//! # Instruction Format
//!
//! ```text
//! [discriminator: 8][len: u32 LE][title][len: u32 LE][message]   create / update
//! [discriminator: 8][len: u32 LE][title]                          delete
//! ```
//!
//! # Accounts (all three instructions)
//!
//! | # | Account | Writable | Signer | Description |
//! |---|---------|----------|--------|-------------|
//! | 0 | journal_entry | ✓ | | PDA of `[title, owner]` |
//! | 1 | owner | ✓ | ✓ | Pays rent, receives refunds |
//! | 2 | system_program | | | System program |

use arrayref::array_ref;
use solana_program::{hash::hash, program_error::ProgramError};

// =============================================================================
// METHOD NAMES
// =============================================================================

pub const CREATE_JOURNAL_ENTRY: &str = "create_journal_entry";
pub const UPDATE_JOURNAL_ENTRY: &str = "update_journal_entry";
pub const DELETE_JOURNAL_ENTRY: &str = "delete_journal_entry";

/// Discriminator of a program method: `sha256("global:<name>")[..8]`.
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let digest = hash(format!("global:{name}").as_bytes()).to_bytes();
    *array_ref![digest, 0, 8]
}

// =============================================================================
// JOURNAL INSTRUCTION ENUM
// =============================================================================

/// All instructions of the journal program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalInstruction {
    /// Create the entry account for `(title, owner)` and store the message.
    CreateJournalEntry { title: String, message: String },

    /// Replace the message of an existing entry. The account is
    /// reallocated, so the owner may pay or receive rent.
    UpdateJournalEntry { title: String, message: String },

    /// Close the entry account; rent returns to the owner.
    DeleteJournalEntry { title: String },
}

impl JournalInstruction {
    /// Method name used for the discriminator.
    pub fn method(&self) -> &'static str {
        match self {
            JournalInstruction::CreateJournalEntry { .. } => CREATE_JOURNAL_ENTRY,
            JournalInstruction::UpdateJournalEntry { .. } => UPDATE_JOURNAL_ENTRY,
            JournalInstruction::DeleteJournalEntry { .. } => DELETE_JOURNAL_ENTRY,
        }
    }

    /// Title the instruction is keyed by.
    pub fn title(&self) -> &str {
        match self {
            JournalInstruction::CreateJournalEntry { title, .. }
            | JournalInstruction::UpdateJournalEntry { title, .. }
            | JournalInstruction::DeleteJournalEntry { title } => title,
        }
    }

    // =========================================================================
    // INSTRUCTION PARSING (UNPACK)
    // =========================================================================

    /// Parse instruction data.
    ///
    /// Used by the in-process ledger to apply submitted transactions.
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        if input.len() < 8 {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (discriminator, rest) = input.split_at(8);

        if discriminator == instruction_discriminator(CREATE_JOURNAL_ENTRY) {
            let (title, rest) = read_string(rest)?;
            let (message, _) = read_string(rest)?;
            Ok(JournalInstruction::CreateJournalEntry { title, message })
        } else if discriminator == instruction_discriminator(UPDATE_JOURNAL_ENTRY) {
            let (title, rest) = read_string(rest)?;
            let (message, _) = read_string(rest)?;
            Ok(JournalInstruction::UpdateJournalEntry { title, message })
        } else if discriminator == instruction_discriminator(DELETE_JOURNAL_ENTRY) {
            let (title, _) = read_string(rest)?;
            Ok(JournalInstruction::DeleteJournalEntry { title })
        } else {
            Err(ProgramError::InvalidInstructionData)
        }
    }

    // =========================================================================
    // INSTRUCTION PACKING
    // =========================================================================

    /// Pack the instruction into bytes.
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + 4 + self.title().len());
        buf.extend_from_slice(&instruction_discriminator(self.method()));

        match self {
            JournalInstruction::CreateJournalEntry { title, message }
            | JournalInstruction::UpdateJournalEntry { title, message } => {
                write_string(&mut buf, title);
                write_string(&mut buf, message);
            }
            JournalInstruction::DeleteJournalEntry { title } => {
                write_string(&mut buf, title);
            }
        }

        buf
    }
}

// =============================================================================
// STRING ENCODING
// =============================================================================

/// Append a u32-LE length-prefixed UTF-8 string.
pub(crate) fn write_string(buf: &mut Vec<u8>, value: &str) {
    buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buf.extend_from_slice(value.as_bytes());
}

/// Read a u32-LE length-prefixed UTF-8 string, returning the remainder.
pub(crate) fn read_string(input: &[u8]) -> Result<(String, &[u8]), ProgramError> {
    if input.len() < 4 {
        return Err(ProgramError::InvalidInstructionData);
    }
    let len = u32::from_le_bytes(*array_ref![input, 0, 4]) as usize;
    let body = &input[4..];
    if body.len() < len {
        return Err(ProgramError::InvalidInstructionData);
    }
    let (bytes, rest) = body.split_at(len);
    let value =
        String::from_utf8(bytes.to_vec()).map_err(|_| ProgramError::InvalidInstructionData)?;
    Ok((value, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminators_are_distinct() {
        let create = instruction_discriminator(CREATE_JOURNAL_ENTRY);
        let update = instruction_discriminator(UPDATE_JOURNAL_ENTRY);
        let delete = instruction_discriminator(DELETE_JOURNAL_ENTRY);
        assert_ne!(create, update);
        assert_ne!(update, delete);
        assert_ne!(create, delete);
    }

    #[test]
    fn test_create_layout() {
        let ix = JournalInstruction::CreateJournalEntry {
            title: "day 1".to_string(),
            message: "hello".to_string(),
        };
        let data = ix.pack();

        assert_eq!(&data[..8], &instruction_discriminator(CREATE_JOURNAL_ENTRY));
        assert_eq!(&data[8..12], &5u32.to_le_bytes());
        assert_eq!(&data[12..17], b"day 1");
        assert_eq!(&data[17..21], &5u32.to_le_bytes());
        assert_eq!(&data[21..], b"hello");
        assert_eq!(JournalInstruction::unpack(&data).unwrap(), ix);
    }

    #[test]
    fn test_delete_unpacks() {
        let ix = JournalInstruction::DeleteJournalEntry {
            title: "gone".to_string(),
        };
        assert_eq!(JournalInstruction::unpack(&ix.pack()).unwrap(), ix);
    }

    #[test]
    fn test_unpack_rejects_truncated_string() {
        let mut data = instruction_discriminator(DELETE_JOURNAL_ENTRY).to_vec();
        data.extend_from_slice(&10u32.to_le_bytes());
        data.extend_from_slice(b"short");
        assert_eq!(
            JournalInstruction::unpack(&data),
            Err(ProgramError::InvalidInstructionData)
        );
    }

    #[test]
    fn test_unpack_rejects_unknown_discriminator() {
        assert_eq!(
            JournalInstruction::unpack(&[0u8; 16]),
            Err(ProgramError::InvalidInstructionData)
        );
        assert_eq!(
            JournalInstruction::unpack(&[1, 2, 3]),
            Err(ProgramError::InvalidInstructionData)
        );
    }
}
