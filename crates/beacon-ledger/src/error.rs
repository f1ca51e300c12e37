//! Ledger and key store error types.
//!
//! - `AlreadyExists` / `NotFound` / `NotALedger`: location-level failures
//!   from `initialize` and `open`
//! - `RoundNotFound` / `ReservedRound`: reads of unpublished or reserved
//!   entries
//! - `Corrupt`: entry present but undecodable
//! - `Conflict` / `OutOfOrder`: append contract violations
//! - `Gap`: rounds published past a missing one
//! - `Io`: underlying storage failures

use std::path::PathBuf;

use thiserror::Error;

/// Errors from ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A ledger already occupies the target location
    #[error("ledger already exists at {}", .location.display())]
    AlreadyExists {
        /// Location passed to `initialize`
        location: PathBuf,
    },

    /// Nothing exists at the location passed to `open`
    #[error("no ledger at {}", .location.display())]
    NotFound {
        /// Location passed to `open`
        location: PathBuf,
    },

    /// Location exists but does not hold a ledger
    #[error("{} is not a ledger: {reason}", .location.display())]
    NotALedger {
        /// Location passed to `open`
        location: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Round has not been published
    #[error("round {round} has not been published")]
    RoundNotFound {
        /// Requested round
        round: u64,
    },

    /// Round 0 holds the master public key and has no ciphertext
    #[error("round 0 is reserved for the master public key")]
    ReservedRound,

    /// Entry exists but cannot be decoded
    #[error("entry {round} is corrupt: {reason}")]
    Corrupt {
        /// Entry index (0 for the master public key)
        round: u64,
        /// Decoder message
        reason: String,
    },

    /// Round already published by another writer
    ///
    /// The existing entry is unchanged. Re-read the latest round and retry
    /// with a freshly combined ciphertext.
    #[error("round {round} already published")]
    Conflict {
        /// Contended round
        round: u64,
    },

    /// Append would leave a gap (or targets round 0)
    #[error("out-of-order append: expected round {expected}, got {got}")]
    OutOfOrder {
        /// Next publishable round (`latest + 1`)
        expected: u64,
        /// Requested round
        got: u64,
    },

    /// A round is missing while later rounds are present
    ///
    /// The ledger was damaged outside the append path. Appends stop until it
    /// is repaired.
    #[error("round {missing} is missing but round {next} is published")]
    Gap {
        /// First missing round (`latest + 1`)
        missing: u64,
        /// First round present past the hole
        next: u64,
    },

    /// I/O error (file system, database, etc.)
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

/// Errors from the recipient key store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyStoreError {
    /// A key file for this party already exists
    #[error("key file already exists: {}", .path.display())]
    AlreadyExists {
        /// Existing file
        path: PathBuf,
    },

    /// No key file for this party
    #[error("no key for party {party} at {}", .path.display())]
    NotFound {
        /// 1-based party number
        party: usize,
        /// Expected file
        path: PathBuf,
    },

    /// Key file cannot be decoded
    #[error("key file {} is corrupt: {reason}", .path.display())]
    Corrupt {
        /// Offending file
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Key file holds a key for another recipient
    #[error("key for party {party} is bound to recipient index {stored}")]
    IndexMismatch {
        /// 1-based party number requested
        party: usize,
        /// Zero-based index found in the file
        stored: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for KeyStoreError {
    fn from(err: std::io::Error) -> Self {
        KeyStoreError::Io(err.to_string())
    }
}
