//! Chaotic ledger wrapper for fault injection testing
//!
//! Wraps any ledger and randomly fails operations with `Io` before they reach
//! the inner ledger. A failed append therefore never publishes, which lets
//! chaos tests check that retries preserve gaplessness.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use beacon_crypto::{Ciphertext, FeScheme};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Ledger, LedgerError, Round};

/// Ledger wrapper that randomly injects failures
///
/// Delegates to an underlying ledger but fails operations based on a
/// configured failure rate. RNG state and the operation counter are shared
/// between clones.
pub struct ChaoticLedger<L> {
    inner: L,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// Seeded stream deciding which operations fail
    rng: Arc<Mutex<ChaCha8Rng>>,
    /// Operations attempted, including failed ones
    operation_count: Arc<AtomicUsize>,
}

impl<L: Clone> Clone for ChaoticLedger<L> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            failure_rate: self.failure_rate,
            rng: Arc::clone(&self.rng),
            operation_count: Arc::clone(&self.operation_count),
        }
    }
}

impl<L> ChaoticLedger<L> {
    /// Wrap `inner` with a fixed default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: L, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Wrap `inner` with an explicit seed for reproducible chaos.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: L, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
            operation_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying ledger (for checking invariants after chaos).
    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Total number of ledger operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operation_count.load(Ordering::SeqCst)
    }

    /// Count the operation and decide whether it fails.
    fn inject(&self) -> Result<(), LedgerError> {
        self.operation_count.fetch_add(1, Ordering::SeqCst);

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if rng.gen_bool(self.failure_rate) {
            return Err(LedgerError::Io("chaotic failure injection".to_string()));
        }
        Ok(())
    }
}

impl<S: FeScheme, L: Ledger<S>> Ledger<S> for ChaoticLedger<L> {
    fn mpk(&self) -> Result<S::PublicKey, LedgerError> {
        self.inject()?;
        self.inner.mpk()
    }

    fn round(&self, n: u64) -> Result<Ciphertext<S::Element>, LedgerError> {
        self.inject()?;
        self.inner.round(n)
    }

    fn latest(&self) -> Result<Option<Round<S::Element>>, LedgerError> {
        self.inject()?;
        self.inner.latest()
    }

    fn latest_index(&self) -> Result<u64, LedgerError> {
        self.inject()?;
        self.inner.latest_index()
    }

    fn check_contiguous(&self) -> Result<(), LedgerError> {
        self.inject()?;
        self.inner.check_contiguous()
    }

    fn append_round(&self, n: u64, ciphertext: &Ciphertext<S::Element>) -> Result<(), LedgerError> {
        self.inject()?;
        self.inner.append_round(n, ciphertext)
    }
}
