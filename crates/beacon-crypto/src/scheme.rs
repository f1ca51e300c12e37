//! The functional-encryption contract consumed by the ledger and search.

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    ciphertext::{Ciphertext, CiphertextElement},
    error::CryptoError,
};

/// Public parameters shared by every encrypt/decrypt call of one ledger.
pub trait MasterKey:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Number of recipients `L` the key was generated for.
    fn parties(&self) -> usize;
}

/// Decryption capability bound to one recipient index.
pub trait RecipientCapability:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Zero-based recipient index `i ∈ [0, L)`.
    fn index(&self) -> usize;
}

/// Inner-product functional-encryption scheme.
///
/// Implementations are injected wherever encryption happens; nothing in the
/// ledger or search layers assumes a particular construction.
///
/// # Invariants
///
/// - `decrypt(mpk, key_i, encrypt(mpk, x)) == x[i]` for every `x` within the
///   scheme's bound
/// - Ciphertexts produced under the same `mpk` have equal length and combine
///   so that decryptions add
pub trait FeScheme: Clone + Send + Sync + 'static {
    /// Master public key type (ledger entry 0).
    type PublicKey: MasterKey;

    /// Per-recipient key type.
    type RecipientKey: RecipientCapability;

    /// Ciphertext coordinate type.
    type Element: CiphertextElement;

    /// Generate a master public key and one key per recipient.
    ///
    /// The returned keys are ordered by recipient index.
    fn generate_keys(
        &self,
        parties: usize,
    ) -> Result<(Self::PublicKey, Vec<Self::RecipientKey>), CryptoError>;

    /// Encrypt a plaintext vector of length `mpk.parties()`.
    fn encrypt(
        &self,
        mpk: &Self::PublicKey,
        plaintext: &[u64],
    ) -> Result<Ciphertext<Self::Element>, CryptoError>;

    /// Recover the recipient's coordinate from a (possibly combined)
    /// ciphertext.
    fn decrypt(
        &self,
        mpk: &Self::PublicKey,
        key: &Self::RecipientKey,
        ciphertext: &Ciphertext<Self::Element>,
    ) -> Result<u64, CryptoError>;

    /// Ciphertext length produced under `mpk`.
    fn ciphertext_len(&self, mpk: &Self::PublicKey) -> usize;
}
