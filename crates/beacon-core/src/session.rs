//! Search Session: enumerate every signal a recipient received in a range.
//!
//! Resolve both boundary counters. If they differ, repeatedly run
//! [`find_last_unchanged`] from the current lower boundary; the round after
//! its result is the next signal. Each event moves the lower boundary
//! forward, and the loop ends once the lower counter reaches the upper one.
//!
//! Decrypted counters are memoized for the lifetime of the session, so a
//! round is decrypted at most once no matter how many searches query it.

use std::collections::HashMap;

use beacon_crypto::{FeScheme, MasterKey, RecipientCapability};
use beacon_ledger::Ledger;

use crate::{ConfigError, Error, LedgerOp, RoundRange, presence::find_last_unchanged};

/// A round at which the recipient's counter increased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvent {
    /// First round with the new counter value
    pub round: u64,
    /// Counter value at `round`
    pub counter: u64,
}

/// Result of one [`SearchSession::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// Resolved lower bound
    pub from: u64,
    /// Resolved upper bound
    pub to: u64,
    /// Signals in `(from, to]`, in round order
    pub events: Vec<SignalEvent>,
    /// Decryptions performed by this run (memoized rounds not counted)
    pub decryptions: usize,
}

impl SearchReport {
    /// Whether no signal arrived in the range.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Search state for one recipient over one ledger.
pub struct SearchSession<S: FeScheme, L> {
    scheme: S,
    ledger: L,
    mpk: S::PublicKey,
    key: S::RecipientKey,
    counters: HashMap<u64, u64>,
    decryptions: usize,
}

impl<S, L> SearchSession<S, L>
where
    S: FeScheme,
    L: Ledger<S>,
{
    /// Bind a recipient key to a ledger.
    ///
    /// # Errors
    ///
    /// - `Ledger` with `ReadMasterKey`: entry 0 unreadable
    /// - `Config(RecipientOutOfRange)`: key index not covered by the ledger
    pub fn new(scheme: S, ledger: L, key: S::RecipientKey) -> Result<Self, Error> {
        let mpk = ledger.mpk().map_err(Error::ledger(LedgerOp::ReadMasterKey))?;

        if key.index() >= mpk.parties() {
            return Err(ConfigError::RecipientOutOfRange {
                got: key.index() + 1,
                parties: mpk.parties(),
            }
            .into());
        }

        Ok(Self { scheme, ledger, mpk, key, counters: HashMap::new(), decryptions: 0 })
    }

    /// Total decryptions since the session was created.
    pub fn decryptions(&self) -> usize {
        self.decryptions
    }

    /// Recipient counter at round `t`. `v(0) == 0` without decryption.
    pub fn counter(&mut self, t: u64) -> Result<u64, Error> {
        if t == 0 {
            return Ok(0);
        }
        if let Some(&value) = self.counters.get(&t) {
            return Ok(value);
        }

        let ciphertext =
            self.ledger.round(t).map_err(Error::ledger(LedgerOp::RetrieveRound(t)))?;
        let value = self
            .scheme
            .decrypt(&self.mpk, &self.key, &ciphertext)
            .map_err(|source| Error::Decrypt { round: t, source })?;

        self.decryptions += 1;
        self.counters.insert(t, value);
        Ok(value)
    }

    /// Enumerate all signal events in `range`.
    ///
    /// `from == to` performs at most one decryption and reports nothing.
    ///
    /// # Errors
    ///
    /// - `Config(InvalidRange)`: `from > to`
    /// - `Ledger` with `RoundNotFound`: a boundary is past the latest round
    /// - `NonMonotonic`: a later counter is smaller than an earlier one
    pub fn run(&mut self, range: RoundRange) -> Result<SearchReport, Error> {
        let start = self.decryptions;

        let to = match range.to {
            Some(to) => to,
            None => self.ledger.latest_index().map_err(Error::ledger(LedgerOp::RetrieveLatest))?,
        };
        let from = range.from;
        if from > to {
            return Err(ConfigError::InvalidRange { from, to }.into());
        }

        let mut events = Vec::new();
        let (mut t1, mut v1) = (from, self.counter(from)?);

        if from < to {
            let v2 = self.counter(to)?;
            if v2 < v1 {
                return Err(Error::NonMonotonic { from, previous: v1, round: to, current: v2 });
            }

            while v1 != v2 {
                let ti = find_last_unchanged(|t| self.counter(t), t1, v1, to)?;
                let round = ti + 1;
                let vi = self.counter(round)?;

                if vi < v1 {
                    return Err(Error::NonMonotonic { from: t1, previous: v1, round, current: vi });
                }

                tracing::info!(round, counter = vi, "signal detected");
                events.push(SignalEvent { round, counter: vi });
                (t1, v1) = (round, vi);
            }
        }

        let report = SearchReport { from, to, events, decryptions: self.decryptions - start };

        tracing::debug!(
            from,
            to,
            events = report.events.len(),
            decryptions = report.decryptions,
            "search finished"
        );
        Ok(report)
    }
}
