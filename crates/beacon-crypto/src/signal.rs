//! Signal encoding.
//!
//! A signal to recipient `j` is the encryption of the standard basis vector
//! `e_j`. This is the only plaintext structure a sender ever produces.

use crate::{
    ciphertext::Ciphertext,
    error::CryptoError,
    scheme::{FeScheme, MasterKey},
};

/// Build the basis vector `e_j` of dimension `parties`.
///
/// # Errors
///
/// - `KeyIndexOutOfRange`: `recipient >= parties`
pub fn unit_vector(parties: usize, recipient: usize) -> Result<Vec<u64>, CryptoError> {
    if recipient >= parties {
        return Err(CryptoError::KeyIndexOutOfRange { index: recipient, parties });
    }

    let mut plaintext = vec![0u64; parties];
    plaintext[recipient] = 1;
    Ok(plaintext)
}

/// Encrypt a unit signal addressed to `recipient` (zero-based).
pub fn encrypt_signal<S: FeScheme>(
    scheme: &S,
    mpk: &S::PublicKey,
    recipient: usize,
) -> Result<Ciphertext<S::Element>, CryptoError> {
    let plaintext = unit_vector(mpk.parties(), recipient)?;
    scheme.encrypt(mpk, &plaintext)
}
