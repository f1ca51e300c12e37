//! DDH-based inner-product functional encryption over Ristretto255.
//!
//! The "simple" IPFE construction of Abdalla, Bourse, De Caro and Pointcheval,
//! restricted to the key vectors Beacon needs: the standard basis. Recipient
//! `j` holds `s_j`, which decrypts exactly coordinate `j` of any ciphertext.
//!
//! ```text
//! msk = (s_0 .. s_{L-1})            h_i = s_i·G
//! Encrypt(x):  r ← Z_q
//!              ct_0     = r·G
//!              ct_{i+1} = r·h_i + x_i·G
//! Decrypt_j:   dlog(ct_{j+1} − s_j·ct_0) = x_j
//! ```
//!
//! Ciphertexts have `L + 1` coordinates. Combining two ciphertexts adds the
//! group elements coordinate-wise, which adds both `r` and `x`, so decrypted
//! counters add.
//!
//! Decryption solves a bounded discrete logarithm. The bound is part of the
//! master public key; a counter past it fails with `DiscreteLogNotFound`.

mod dlog;
mod encoding;

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use curve25519_dalek::{RistrettoPoint, Scalar};
use rand::{CryptoRng, RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};

use self::dlog::BabySteps;
pub use self::encoding::GroupElement;
use crate::{
    ciphertext::Ciphertext,
    error::CryptoError,
    scheme::{FeScheme, MasterKey, RecipientCapability},
};

/// Largest counter value recoverable under a key generated without an
/// explicit bound.
pub const DEFAULT_BOUND: u64 = 1 << 20;

/// Largest bound a key may carry. Decryption keeps `isqrt(bound)` baby steps
/// in memory, about 48 MiB at this bound.
pub const MAX_BOUND: u64 = 1 << 40;

fn check_bound(bound: u64) -> Result<(), CryptoError> {
    if bound > MAX_BOUND {
        return Err(CryptoError::BoundTooLarge { bound, max: MAX_BOUND });
    }
    Ok(())
}

/// Master public key: the bound and one generator `h_i` per recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DdhPublicKey {
    bound: u64,
    generators: Vec<GroupElement>,
}

impl DdhPublicKey {
    /// Largest plaintext coordinate decryption can recover.
    pub fn bound(&self) -> u64 {
        self.bound
    }
}

impl MasterKey for DdhPublicKey {
    fn parties(&self) -> usize {
        self.generators.len()
    }
}

/// Derived key for one basis vector.
///
/// Serialized as `{ "index": i, "derivedKey": "<hex scalar>" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DdhRecipientKey {
    index: usize,
    #[serde(with = "encoding::scalar_hex")]
    derived_key: Scalar,
}

impl RecipientCapability for DdhRecipientKey {
    fn index(&self) -> usize {
        self.index
    }
}

/// Production FE scheme.
///
/// Clones share the baby-step table, which is built on first decryption.
#[derive(Clone)]
pub struct DdhScheme {
    bound: u64,
    baby_steps: Arc<OnceLock<BabySteps>>,
}

impl DdhScheme {
    /// Scheme generating keys with [`DEFAULT_BOUND`].
    pub fn new() -> Self {
        Self::with_bound(DEFAULT_BOUND)
    }

    /// Scheme generating keys whose counters are recoverable up to `bound`.
    ///
    /// Only affects key generation; decryption always uses the bound
    /// recorded in the master public key. A bound past [`MAX_BOUND`] is
    /// rejected when keys are generated.
    pub fn with_bound(bound: u64) -> Self {
        Self { bound, baby_steps: Arc::new(OnceLock::new()) }
    }

    /// Key generation with a caller-provided RNG.
    ///
    /// # Errors
    ///
    /// - `InvalidPartyCount`: `parties == 0`
    /// - `BoundTooLarge`: the scheme's bound exceeds [`MAX_BOUND`]
    pub fn generate_keys_with_rng<R: RngCore + CryptoRng>(
        &self,
        parties: usize,
        rng: &mut R,
    ) -> Result<(DdhPublicKey, Vec<DdhRecipientKey>), CryptoError> {
        if parties == 0 {
            return Err(CryptoError::InvalidPartyCount { parties });
        }
        check_bound(self.bound)?;

        let msk: Vec<Scalar> = (0..parties).map(|_| Scalar::random(rng)).collect();
        let generators =
            msk.iter().map(|s| GroupElement::new(RistrettoPoint::mul_base(s))).collect();

        let keys = (0..parties)
            .map(|index| {
                let selector = crate::signal::unit_vector(parties, index)?;
                Ok(DdhRecipientKey { index, derived_key: derive_key(&msk, &selector) })
            })
            .collect::<Result<Vec<_>, CryptoError>>()?;

        tracing::debug!(parties, bound = self.bound, "generated ddh key material");

        Ok((DdhPublicKey { bound: self.bound, generators }, keys))
    }

    /// Encryption with a caller-provided RNG.
    ///
    /// # Errors
    ///
    /// - `PlaintextLength`: `plaintext.len() != mpk.parties()`
    /// - `PlaintextOutOfBound`: a coordinate exceeds `mpk.bound()`
    pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
        &self,
        mpk: &DdhPublicKey,
        plaintext: &[u64],
        rng: &mut R,
    ) -> Result<Ciphertext<GroupElement>, CryptoError> {
        if plaintext.len() != mpk.parties() {
            return Err(CryptoError::PlaintextLength {
                expected: mpk.parties(),
                actual: plaintext.len(),
            });
        }
        if let Some(&value) = plaintext.iter().find(|&&x| x > mpk.bound) {
            return Err(CryptoError::PlaintextOutOfBound { value, bound: mpk.bound });
        }

        let r = Scalar::random(rng);
        let mut vector = Vec::with_capacity(plaintext.len() + 1);
        vector.push(GroupElement::new(RistrettoPoint::mul_base(&r)));

        for (h, &x) in mpk.generators.iter().zip(plaintext) {
            let point = r * h.point() + RistrettoPoint::mul_base(&Scalar::from(x));
            vector.push(GroupElement::new(point));
        }

        debug_assert_eq!(vector.len(), self.ciphertext_len(mpk));

        Ok(Ciphertext::new(vector))
    }

    fn solve(&self, bound: u64, target: RistrettoPoint) -> Option<u64> {
        let cached = self.baby_steps.get_or_init(|| BabySteps::new(bound));
        if cached.bound() == bound {
            cached.solve(target)
        } else {
            BabySteps::new(bound).solve(target)
        }
    }
}

impl Default for DdhScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DdhScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdhScheme")
            .field("bound", &self.bound)
            .field("table_built", &self.baby_steps.get().is_some())
            .finish()
    }
}

fn derive_key(msk: &[Scalar], selector: &[u64]) -> Scalar {
    msk.iter().zip(selector).map(|(s, &y)| s * Scalar::from(y)).sum()
}

impl FeScheme for DdhScheme {
    type PublicKey = DdhPublicKey;
    type RecipientKey = DdhRecipientKey;
    type Element = GroupElement;

    fn generate_keys(
        &self,
        parties: usize,
    ) -> Result<(DdhPublicKey, Vec<DdhRecipientKey>), CryptoError> {
        self.generate_keys_with_rng(parties, &mut OsRng)
    }

    fn encrypt(
        &self,
        mpk: &DdhPublicKey,
        plaintext: &[u64],
    ) -> Result<Ciphertext<GroupElement>, CryptoError> {
        self.encrypt_with_rng(mpk, plaintext, &mut OsRng)
    }

    fn decrypt(
        &self,
        mpk: &DdhPublicKey,
        key: &DdhRecipientKey,
        ciphertext: &Ciphertext<GroupElement>,
    ) -> Result<u64, CryptoError> {
        let parties = mpk.parties();
        if key.index >= parties {
            return Err(CryptoError::KeyIndexOutOfRange { index: key.index, parties });
        }
        if ciphertext.len() != self.ciphertext_len(mpk) {
            return Err(CryptoError::CiphertextLength {
                expected: self.ciphertext_len(mpk),
                actual: ciphertext.len(),
            });
        }

        // The bound comes from ledger entry 0 and sizes the baby-step table
        check_bound(mpk.bound)?;

        let elements = ciphertext.elements();
        let masked = elements[key.index + 1].point() - key.derived_key * elements[0].point();

        self.solve(mpk.bound, masked)
            .ok_or(CryptoError::DiscreteLogNotFound { bound: mpk.bound })
    }

    fn ciphertext_len(&self, mpk: &DdhPublicKey) -> usize {
        mpk.parties() + 1
    }
}
