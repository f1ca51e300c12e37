//! Plaintext mock scheme.
//!
//! Ciphertext coordinates are the plaintext integers themselves and
//! `combine` is integer addition. Satisfies the [`FeScheme`] contract without
//! any confidentiality, which makes ledger and search behavior easy to
//! inspect in tests. Counts decryptions so tests can assert how many the
//! search performed.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    ciphertext::{Ciphertext, CiphertextElement},
    error::CryptoError,
    scheme::{FeScheme, MasterKey, RecipientCapability},
};

/// Plaintext integer posing as a ciphertext coordinate.
///
/// Serialized as a decimal string, matching the ledger record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainElement(u64);

impl PlainElement {
    /// Wrap a plaintext value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The wrapped value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl CiphertextElement for PlainElement {
    fn combine(&self, other: &Self) -> Self {
        Self(self.0.wrapping_add(other.0))
    }
}

impl fmt::Display for PlainElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for PlainElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlainElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse::<u64>().map(Self).map_err(serde::de::Error::custom)
    }
}

/// Public parameters of the mock scheme: only the dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainPublicKey {
    parties: usize,
}

impl MasterKey for PlainPublicKey {
    fn parties(&self) -> usize {
        self.parties
    }
}

/// Recipient key of the mock scheme: only the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainRecipientKey {
    index: usize,
}

impl PlainRecipientKey {
    /// Key for the recipient at `index`.
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

impl RecipientCapability for PlainRecipientKey {
    fn index(&self) -> usize {
        self.index
    }
}

/// Mock FE scheme for tests and simulation.
///
/// Clones share the decryption counter.
#[derive(Debug, Clone, Default)]
pub struct PlainScheme {
    decryptions: Arc<AtomicUsize>,
}

impl PlainScheme {
    /// Create a scheme with a zeroed decryption counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total decryptions performed through this scheme and its clones.
    pub fn decryptions(&self) -> usize {
        self.decryptions.load(Ordering::SeqCst)
    }
}

impl FeScheme for PlainScheme {
    type PublicKey = PlainPublicKey;
    type RecipientKey = PlainRecipientKey;
    type Element = PlainElement;

    fn generate_keys(
        &self,
        parties: usize,
    ) -> Result<(PlainPublicKey, Vec<PlainRecipientKey>), CryptoError> {
        if parties == 0 {
            return Err(CryptoError::InvalidPartyCount { parties });
        }

        let keys = (0..parties).map(PlainRecipientKey::new).collect();
        Ok((PlainPublicKey { parties }, keys))
    }

    fn encrypt(
        &self,
        mpk: &PlainPublicKey,
        plaintext: &[u64],
    ) -> Result<Ciphertext<PlainElement>, CryptoError> {
        if plaintext.len() != mpk.parties {
            return Err(CryptoError::PlaintextLength {
                expected: mpk.parties,
                actual: plaintext.len(),
            });
        }

        Ok(Ciphertext::new(plaintext.iter().copied().map(PlainElement).collect()))
    }

    fn decrypt(
        &self,
        mpk: &PlainPublicKey,
        key: &PlainRecipientKey,
        ciphertext: &Ciphertext<PlainElement>,
    ) -> Result<u64, CryptoError> {
        if key.index >= mpk.parties {
            return Err(CryptoError::KeyIndexOutOfRange {
                index: key.index,
                parties: mpk.parties,
            });
        }
        if ciphertext.len() != mpk.parties {
            return Err(CryptoError::CiphertextLength {
                expected: mpk.parties,
                actual: ciphertext.len(),
            });
        }

        self.decryptions.fetch_add(1, Ordering::SeqCst);
        Ok(ciphertext.elements()[key.index].value())
    }

    fn ciphertext_len(&self, mpk: &PlainPublicKey) -> usize {
        mpk.parties
    }
}
