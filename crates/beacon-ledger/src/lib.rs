//! Beacon Round Ledger
//!
//! Append-only, gapless sequence of immutable entries. Entry 0 holds the
//! master public key; entry `n >= 1` holds the cumulative ciphertext after
//! the `n`-th signal. Decrypting the latest entry with a recipient key yields
//! that recipient's running signal count.
//!
//! # Backends
//!
//! - [`MemoryLedger`]: shared in-process state for tests and simulation
//! - [`DirLedger`]: one JSON file per entry, exclusive create via hard link,
//!   safe across processes
//! - [`RedbLedger`]: single-file ACID database
//! - [`ChaoticLedger`]: fault-injecting wrapper for chaos tests
//!
//! Recipient keys live outside the ledger in a [`KeyStore`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chaotic;
mod dir;
mod error;
mod keystore;
mod memory;
pub mod record;
mod redb;

use std::path::Path;

use beacon_crypto::{Ciphertext, FeScheme};
pub use chaotic::ChaoticLedger;
pub use dir::DirLedger;
pub use error::{KeyStoreError, LedgerError};
pub use keystore::{KeyStore, StagedKeys};
pub use memory::MemoryLedger;
pub use record::Round;

pub use self::redb::RedbLedger;

/// Round ledger capability.
///
/// Must be Clone (handed to every sender and searcher), Send + Sync
/// (concurrent readers), and synchronous. Implementations share state
/// through `Arc` or the filesystem, so clones observe the same ledger.
///
/// # Invariants
///
/// - Published round indices are exactly `{1, ..., N}` for some `N >= 0`
/// - A published round never changes
/// - Readers observe a round completely or not at all
pub trait Ledger<S: FeScheme>: Clone + Send + Sync + 'static {
    /// Read entry 0.
    ///
    /// # Errors
    ///
    /// - `Corrupt { round: 0 }`: entry 0 missing or undecodable
    fn mpk(&self) -> Result<S::PublicKey, LedgerError>;

    /// Read round `n >= 1`.
    ///
    /// # Errors
    ///
    /// - `ReservedRound`: `n == 0`
    /// - `RoundNotFound`: `n` not yet published
    fn round(&self, n: u64) -> Result<Ciphertext<S::Element>, LedgerError>;

    /// Highest contiguous published round, or `None` if only entry 0 exists.
    fn latest(&self) -> Result<Option<Round<S::Element>>, LedgerError>;

    /// Highest contiguous published round index (0 when empty).
    fn latest_index(&self) -> Result<u64, LedgerError> {
        Ok(self.latest()?.map_or(0, |round| round.index))
    }

    /// Verify no round is present past the latest one.
    ///
    /// Backends that cannot hold a hole keep the default.
    ///
    /// # Errors
    ///
    /// - `Gap`: a round is missing below a published one
    fn check_contiguous(&self) -> Result<(), LedgerError> {
        Ok(())
    }

    /// Publish round `n`.
    ///
    /// # Invariants
    ///
    /// - Pre: `n == latest_index() + 1`
    /// - Post: round `n` is visible to every subsequent read
    ///
    /// # Errors
    ///
    /// - `Conflict`: round `n` already published (exclusive create lost)
    /// - `OutOfOrder`: `n` would leave a gap, or `n == 0`
    /// - `Gap`: the ledger already has a hole
    fn append_round(&self, n: u64, ciphertext: &Ciphertext<S::Element>) -> Result<(), LedgerError>;
}

/// Ledger that lives at a filesystem location.
pub trait LedgerStore<S: FeScheme>: Ledger<S> + Sized {
    /// Create a fresh ledger holding only entry 0 = `mpk`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: a ledger already occupies `location`
    fn initialize(location: &Path, mpk: &S::PublicKey) -> Result<Self, LedgerError>;

    /// Attach to an existing ledger.
    ///
    /// # Errors
    ///
    /// - `NotFound`: nothing at `location`
    /// - `NotALedger`: `location` exists but is not a ledger
    fn open(location: &Path) -> Result<Self, LedgerError>;
}
