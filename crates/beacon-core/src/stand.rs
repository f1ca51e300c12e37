//! Ledger lifecycle with operation context attached.

use std::path::Path;

use beacon_crypto::FeScheme;
use beacon_ledger::LedgerStore;

use crate::{Error, LedgerOp};

/// Create a fresh ledger at `location` holding only `mpk`.
///
/// # Errors
///
/// - `Ledger` with `AlreadyExists`: a ledger already occupies `location`
pub fn initialize_ledger<S, L>(location: &Path, mpk: &S::PublicKey) -> Result<L, Error>
where
    S: FeScheme,
    L: LedgerStore<S>,
{
    let ledger = <L as LedgerStore<S>>::initialize(location, mpk)
        .map_err(Error::ledger(LedgerOp::Initialize))?;

    tracing::info!(location = %location.display(), "initialized ledger");
    Ok(ledger)
}

/// Attach to the ledger at `location`.
///
/// # Errors
///
/// - `Ledger` with `NotFound` or `NotALedger`
pub fn open_ledger<S, L>(location: &Path) -> Result<L, Error>
where
    S: FeScheme,
    L: LedgerStore<S>,
{
    <L as LedgerStore<S>>::open(location).map_err(Error::ledger(LedgerOp::Open))
}
