//! Per-invocation configuration.
//!
//! Parsed arguments are converted once into these immutable structs and
//! passed to the handlers; nothing reads flags after that.

use std::path::{Path, PathBuf};

use beacon_core::RoundRange;
use beacon_ledger::KeyStore;
use clap::ValueEnum;

/// Ledger storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Backend {
    /// One JSON file per round under `<stand>/repo` (multi-process safe)
    #[default]
    Dir,
    /// Single Redb database at `<stand>/ledger.redb` (one process at a time)
    Redb,
}

/// Layout of a stand: the ledger plus the recipient key directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandConfig {
    root: PathBuf,
    backend: Backend,
}

impl StandConfig {
    pub fn new(root: impl Into<PathBuf>, backend: Backend) -> Self {
        Self { root: root.into(), backend }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn ledger_path(&self) -> PathBuf {
        match self.backend {
            Backend::Dir => self.root.join("repo"),
            Backend::Redb => self.root.join("ledger.redb"),
        }
    }

    pub fn key_store(&self) -> KeyStore {
        KeyStore::new(self.root.join("parties"))
    }
}

/// `keygen` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeygenConfig {
    pub parties: usize,
    /// Largest per-recipient counter decryption will recover
    pub bound: u64,
}

/// `send-signal` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendConfig {
    /// 1-based recipient
    pub party: usize,
    /// Extra attempts after losing an append race
    pub retries: u32,
}

/// `search` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// 1-based recipient
    pub party: usize,
    pub range: RoundRange,
}

/// One command with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandConfig {
    Keygen(KeygenConfig),
    SendSignal(SendConfig),
    Search(SearchConfig),
    Audit,
}
