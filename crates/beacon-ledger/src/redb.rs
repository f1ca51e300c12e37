//! Redb-backed ledger.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety. Appends
//! run inside a single write transaction, and Redb serializes write
//! transactions, so the gapless/exclusive check and the insert are atomic.
//!
//! Redb locks the database file to one process. Use [`DirLedger`] when
//! several processes publish concurrently.
//!
//! [`DirLedger`]: crate::DirLedger

use std::{fmt::Display, marker::PhantomData, path::Path, sync::Arc};

use beacon_crypto::{Ciphertext, FeScheme};
use redb::{Database, DatabaseError, ReadableTable, TableDefinition};

use crate::{Ledger, LedgerError, LedgerStore, Round, record::GenesisRecord};

/// Table: genesis
/// Key: "mpk"
/// Value: CBOR-encoded genesis record
const GENESIS: TableDefinition<&str, &[u8]> = TableDefinition::new("genesis");

/// Table: rounds
/// Key: round index (n >= 1)
/// Value: CBOR-encoded ciphertext record
const ROUNDS: TableDefinition<u64, &[u8]> = TableDefinition::new("rounds");

const MPK_KEY: &str = "mpk";

fn io_err(err: impl Display) -> LedgerError {
    LedgerError::Io(err.to_string())
}

/// Durable ledger backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
pub struct RedbLedger<S> {
    db: Arc<Database>,
    _scheme: PhantomData<fn() -> S>,
}

impl<S> Clone for RedbLedger<S> {
    fn clone(&self) -> Self {
        Self { db: Arc::clone(&self.db), _scheme: PhantomData }
    }
}

impl<S: FeScheme> RedbLedger<S> {
    /// Highest contiguous round and the first key present past it.
    ///
    /// Keys are unique and start at 1, so the table is gapless exactly when
    /// its length equals its last key; only a damaged table is walked.
    fn contiguous<T: ReadableTable<u64, &'static [u8]>>(
        table: &T,
    ) -> Result<(u64, Option<u64>), LedgerError> {
        let Some(last) = table.last().map_err(io_err)?.map(|(key, _)| key.value()) else {
            return Ok((0, None));
        };
        if table.len().map_err(io_err)? == last {
            return Ok((last, None));
        }

        let mut latest = 0;
        for entry in table.iter().map_err(io_err)? {
            let key = entry.map_err(io_err)?.0.value();
            if key != latest + 1 {
                return Ok((latest, Some(key)));
            }
            latest = key;
        }
        Ok((latest, None))
    }
}

impl<S: FeScheme> Ledger<S> for RedbLedger<S> {
    fn mpk(&self) -> Result<S::PublicKey, LedgerError> {
        let txn = self.db.begin_read().map_err(io_err)?;
        let table = txn.open_table(GENESIS).map_err(|e| LedgerError::Corrupt {
            round: 0,
            reason: e.to_string(),
        })?;

        let entry = table.get(MPK_KEY).map_err(io_err)?.ok_or_else(|| LedgerError::Corrupt {
            round: 0,
            reason: "master public key entry is missing".to_string(),
        })?;

        ciborium::from_reader::<GenesisRecord<S::PublicKey>, _>(entry.value())
            .map(|record| record.mpk)
            .map_err(|e| LedgerError::Corrupt { round: 0, reason: e.to_string() })
    }

    fn round(&self, n: u64) -> Result<Ciphertext<S::Element>, LedgerError> {
        if n == 0 {
            return Err(LedgerError::ReservedRound);
        }

        let txn = self.db.begin_read().map_err(io_err)?;
        let table = txn.open_table(ROUNDS).map_err(io_err)?;
        let entry = table.get(n).map_err(io_err)?.ok_or(LedgerError::RoundNotFound { round: n })?;

        ciborium::from_reader(entry.value())
            .map_err(|e| LedgerError::Corrupt { round: n, reason: e.to_string() })
    }

    fn latest(&self) -> Result<Option<Round<S::Element>>, LedgerError> {
        let txn = self.db.begin_read().map_err(io_err)?;
        let table = txn.open_table(ROUNDS).map_err(io_err)?;

        let (index, _) = Self::contiguous(&table)?;
        if index == 0 {
            return Ok(None);
        }

        let entry =
            table.get(index).map_err(io_err)?.ok_or(LedgerError::RoundNotFound { round: index })?;
        let ciphertext = ciborium::from_reader(entry.value())
            .map_err(|e| LedgerError::Corrupt { round: index, reason: e.to_string() })?;

        Ok(Some(Round { index, ciphertext }))
    }

    fn latest_index(&self) -> Result<u64, LedgerError> {
        let txn = self.db.begin_read().map_err(io_err)?;
        let table = txn.open_table(ROUNDS).map_err(io_err)?;

        Ok(Self::contiguous(&table)?.0)
    }

    fn check_contiguous(&self) -> Result<(), LedgerError> {
        let txn = self.db.begin_read().map_err(io_err)?;
        let table = txn.open_table(ROUNDS).map_err(io_err)?;

        match Self::contiguous(&table)? {
            (latest, Some(next)) => Err(LedgerError::Gap { missing: latest + 1, next }),
            (_, None) => Ok(()),
        }
    }

    fn append_round(&self, n: u64, ciphertext: &Ciphertext<S::Element>) -> Result<(), LedgerError> {
        let mut bytes = Vec::new();
        ciborium::into_writer(ciphertext, &mut bytes).map_err(io_err)?;

        let txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = txn.open_table(ROUNDS).map_err(io_err)?;
            let (latest, detached) = Self::contiguous(&table)?;

            if n >= 1 && n <= latest {
                return Err(LedgerError::Conflict { round: n });
            }
            if let Some(next) = detached {
                return Err(LedgerError::Gap { missing: latest + 1, next });
            }
            if n != latest + 1 {
                return Err(LedgerError::OutOfOrder { expected: latest + 1, got: n });
            }

            table.insert(n, bytes.as_slice()).map_err(io_err)?;
        }
        txn.commit().map_err(io_err)?;

        tracing::debug!(round = n, "published round entry");
        Ok(())
    }
}

impl<S: FeScheme> LedgerStore<S> for RedbLedger<S> {
    fn initialize(location: &Path, mpk: &S::PublicKey) -> Result<Self, LedgerError> {
        if location.try_exists()? {
            return Err(LedgerError::AlreadyExists { location: location.to_path_buf() });
        }
        if let Some(parent) = location.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut bytes = Vec::new();
        ciborium::into_writer(&GenesisRecord { mpk }, &mut bytes).map_err(io_err)?;

        let db = Database::create(location).map_err(io_err)?;
        let txn = db.begin_write().map_err(io_err)?;
        {
            let mut genesis = txn.open_table(GENESIS).map_err(io_err)?;
            genesis.insert(MPK_KEY, bytes.as_slice()).map_err(io_err)?;
            let _ = txn.open_table(ROUNDS).map_err(io_err)?;
        }
        txn.commit().map_err(io_err)?;

        Ok(Self { db: Arc::new(db), _scheme: PhantomData })
    }

    fn open(location: &Path) -> Result<Self, LedgerError> {
        if !location.try_exists()? {
            return Err(LedgerError::NotFound { location: location.to_path_buf() });
        }

        let not_a_ledger = |reason: String| LedgerError::NotALedger {
            location: location.to_path_buf(),
            reason,
        };

        let db = Database::open(location).map_err(|e| match e {
            // Valid ledger held by another process
            DatabaseError::DatabaseAlreadyOpen => io_err(e),
            e => not_a_ledger(e.to_string()),
        })?;
        {
            let txn = db.begin_read().map_err(io_err)?;
            let genesis = txn.open_table(GENESIS).map_err(|e| not_a_ledger(e.to_string()))?;
            if genesis.get(MPK_KEY).map_err(io_err)?.is_none() {
                return Err(not_a_ledger("master public key entry is missing".to_string()));
            }
        }

        Ok(Self { db: Arc::new(db), _scheme: PhantomData })
    }
}
