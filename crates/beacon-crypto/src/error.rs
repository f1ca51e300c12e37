//! Error types for the functional-encryption layer

use thiserror::Error;

/// Errors from the functional-encryption primitive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Scheme cannot be configured for this many recipients
    #[error("invalid party count: {parties}")]
    InvalidPartyCount {
        /// Requested number of recipients
        parties: usize,
    },

    /// Plaintext vector does not match the scheme dimension
    #[error("plaintext length mismatch: expected {expected}, got {actual}")]
    PlaintextLength {
        /// Scheme dimension (number of recipients)
        expected: usize,
        /// Length of the provided plaintext
        actual: usize,
    },

    /// Plaintext coordinate exceeds the bound fixed at key generation
    #[error("plaintext value {value} exceeds bound {bound}")]
    PlaintextOutOfBound {
        /// Offending coordinate value
        value: u64,
        /// Maximum permitted value
        bound: u64,
    },

    /// Counter bound too large to hold a discrete-log table for
    #[error("bound {bound} exceeds maximum {max}")]
    BoundTooLarge {
        /// Requested or stored bound
        bound: u64,
        /// Largest supported bound
        max: u64,
    },

    /// Ciphertext vector does not match the dimension of the public key
    #[error("ciphertext length mismatch: expected {expected}, got {actual}")]
    CiphertextLength {
        /// Length implied by the public key
        expected: usize,
        /// Length of the provided ciphertext
        actual: usize,
    },

    /// Recipient key is bound to an index the public key does not cover
    #[error("recipient key index {index} out of range for {parties} parties")]
    KeyIndexOutOfRange {
        /// Index stored in the key
        index: usize,
        /// Number of recipients in the public key
        parties: usize,
    },

    /// Decrypted group element is not `v·G` for any `v` within the bound
    #[error("decrypted value not found within bound {bound}")]
    DiscreteLogNotFound {
        /// Search bound that was exhausted
        bound: u64,
    },
}

/// Errors from combining two ciphertexts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CiphertextError {
    /// Operands have different lengths and cannot be combined
    #[error("ciphertext length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Length of the left operand
        left: usize,
        /// Length of the right operand
        right: usize,
    },
}
