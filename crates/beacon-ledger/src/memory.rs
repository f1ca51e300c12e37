//! In-memory ledger for tests and simulation.

use std::sync::{Arc, Mutex, MutexGuard};

use beacon_crypto::{Ciphertext, FeScheme};

use crate::{Ledger, LedgerError, Round};

/// In-memory ledger.
///
/// Rounds are kept in a `Vec` where position `i` holds round `i + 1`, so
/// gaplessness holds by construction. Clones share state through
/// `Arc<Mutex<..>>`. A poisoned lock surfaces as `Io` instead of panicking.
#[derive(Clone)]
pub struct MemoryLedger<S: FeScheme> {
    inner: Arc<Mutex<MemoryLedgerInner<S>>>,
}

struct MemoryLedgerInner<S: FeScheme> {
    mpk: S::PublicKey,
    rounds: Vec<Ciphertext<S::Element>>,
}

impl<S: FeScheme> MemoryLedger<S> {
    /// Create a ledger holding only entry 0 = `mpk`.
    pub fn new(mpk: S::PublicKey) -> Self {
        Self { inner: Arc::new(Mutex::new(MemoryLedgerInner { mpk, rounds: Vec::new() })) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryLedgerInner<S>>, LedgerError> {
        self.inner.lock().map_err(|_| LedgerError::Io("memory ledger lock poisoned".to_string()))
    }
}

impl<S: FeScheme> Ledger<S> for MemoryLedger<S> {
    fn mpk(&self) -> Result<S::PublicKey, LedgerError> {
        Ok(self.lock()?.mpk.clone())
    }

    fn round(&self, n: u64) -> Result<Ciphertext<S::Element>, LedgerError> {
        if n == 0 {
            return Err(LedgerError::ReservedRound);
        }

        let inner = self.lock()?;
        inner.rounds.get((n - 1) as usize).cloned().ok_or(LedgerError::RoundNotFound { round: n })
    }

    fn latest(&self) -> Result<Option<Round<S::Element>>, LedgerError> {
        let inner = self.lock()?;
        Ok(inner
            .rounds
            .last()
            .map(|ciphertext| Round { index: inner.rounds.len() as u64, ciphertext: ciphertext.clone() }))
    }

    fn latest_index(&self) -> Result<u64, LedgerError> {
        Ok(self.lock()?.rounds.len() as u64)
    }

    fn append_round(&self, n: u64, ciphertext: &Ciphertext<S::Element>) -> Result<(), LedgerError> {
        let mut inner = self.lock()?;
        let latest = inner.rounds.len() as u64;

        if n >= 1 && n <= latest {
            return Err(LedgerError::Conflict { round: n });
        }
        if n != latest + 1 {
            return Err(LedgerError::OutOfOrder { expected: latest + 1, got: n });
        }

        inner.rounds.push(ciphertext.clone());

        debug_assert_eq!(inner.rounds.len() as u64, n);

        Ok(())
    }
}
