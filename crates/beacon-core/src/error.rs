//! Core error types.
//!
//! Every failure carries the operation and, where one exists, the round index
//! it happened at. Sources are chained so the CLI can print the full context.

use std::fmt;

use beacon_crypto::{CiphertextError, CryptoError};
use beacon_ledger::LedgerError;
use thiserror::Error;

/// Invalid user-supplied parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Key generation needs at least `min` recipients
    #[error("at least {min} parties required, got {got}")]
    TooFewParties {
        /// Minimum party count
        min: usize,
        /// Requested party count
        got: usize,
    },

    /// Party number outside `[1, parties]`
    #[error("party {got} out of range [1; {parties}]")]
    RecipientOutOfRange {
        /// Requested 1-based party
        got: usize,
        /// Number of recipients in the ledger
        parties: usize,
    },

    /// Round range with `from > to`
    #[error("invalid round range [{from}; {to}]")]
    InvalidRange {
        /// Lower bound
        from: u64,
        /// Upper bound
        to: u64,
    },
}

/// Ledger operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    /// Creating a fresh ledger
    Initialize,
    /// Attaching to an existing ledger
    Open,
    /// Reading entry 0
    ReadMasterKey,
    /// Reading one round
    RetrieveRound(u64),
    /// Resolving the latest round
    RetrieveLatest,
    /// Looking for rounds past a missing one
    CheckContiguity,
    /// Appending one round
    Publish(u64),
}

impl fmt::Display for LedgerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialize => write!(f, "initialize ledger"),
            Self::Open => write!(f, "open ledger"),
            Self::ReadMasterKey => write!(f, "read master public key"),
            Self::RetrieveRound(n) => write!(f, "retrieve round {n}"),
            Self::RetrieveLatest => write!(f, "retrieve latest round"),
            Self::CheckContiguity => write!(f, "check ledger contiguity"),
            Self::Publish(n) => write!(f, "publish round {n}"),
        }
    }
}

/// Errors from core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid parameters
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// FE key generation failed
    #[error("key generation failed")]
    Keygen(#[source] CryptoError),

    /// Encrypting the unit signal failed
    #[error("failed to encrypt signal for recipient {recipient}")]
    Encrypt {
        /// Zero-based recipient index
        recipient: usize,
        /// Scheme failure
        #[source]
        source: CryptoError,
    },

    /// Decrypting a round failed
    #[error("failed to decrypt round {round}")]
    Decrypt {
        /// Round being decrypted
        round: u64,
        /// Scheme failure
        #[source]
        source: CryptoError,
    },

    /// The fresh signal could not be combined with the latest round
    #[error("failed to combine signal with round {round}")]
    Combine {
        /// Latest round at the time
        round: u64,
        /// Combiner failure
        #[source]
        source: CiphertextError,
    },

    /// A ledger operation failed
    #[error("failed to {operation}")]
    Ledger {
        /// What was being done
        operation: LedgerOp,
        /// Ledger failure
        #[source]
        source: LedgerError,
    },

    /// A round's ciphertext does not have the length implied by the master
    /// public key
    #[error("round {round} has {actual} coordinates, expected {expected}")]
    MalformedRound {
        /// Offending round
        round: u64,
        /// Length implied by the master public key
        expected: usize,
        /// Length found
        actual: usize,
    },

    /// A recipient counter decreased, so the ledger was not built from unit
    /// signal appends
    #[error("counter decreased from {previous} at round {from} to {current} at round {round}")]
    NonMonotonic {
        /// Earlier round
        from: u64,
        /// Counter at `from`
        previous: u64,
        /// Later round
        round: u64,
        /// Counter at `round`
        current: u64,
    },
}

impl Error {
    /// Whether this is a lost append race.
    ///
    /// The caller may re-read the latest round and retry; nothing in the core
    /// retries automatically.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Ledger { source: LedgerError::Conflict { .. }, .. })
    }

    pub(crate) fn ledger(operation: LedgerOp) -> impl FnOnce(LedgerError) -> Self {
        move |source| Self::Ledger { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_ledger_context_chain() {
        let err = Error::ledger(LedgerOp::Publish(4))(LedgerError::Conflict { round: 4 });

        assert_eq!(err.to_string(), "failed to publish round 4");
        assert_eq!(err.source().map(ToString::to_string), Some("round 4 already published".to_string()));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        let err = Error::ledger(LedgerOp::Publish(4))(LedgerError::OutOfOrder { expected: 2, got: 4 });
        assert!(!err.is_conflict());

        let err = Error::from(ConfigError::TooFewParties { min: 2, got: 1 });
        assert!(!err.is_conflict());
        assert_eq!(err.to_string(), "at least 2 parties required, got 1");
    }
}
