//! CLI error type. The only place errors are rendered is `main`.

use beacon_ledger::KeyStoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] beacon_core::Error),

    #[error("failed to save recipient keys")]
    SaveKeys(#[source] KeyStoreError),

    #[error("failed to load key for party {party}")]
    LoadKey {
        party: usize,
        #[source]
        source: KeyStoreError,
    },
}
