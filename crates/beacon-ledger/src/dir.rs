//! Directory-backed ledger.
//!
//! One file per entry, `round_{n}.json`, entry 0 holding the master public
//! key. Entries are written to a private temp file, synced, and then
//! published with `hard_link`, which fails if the target exists. This gives
//! two properties without any lock:
//!
//! - readers see either the complete entry or no file at all
//! - of several writers racing for the same round, exactly one link succeeds
//!
//! Safe to share between processes.
//!
//! The latest round is the end of the contiguous run of entries from round 1.
//! An entry past a missing file is never counted, and appends refuse to fill
//! the hole.

use std::{
    collections::BTreeSet,
    fs::{self, File},
    io::{self, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use beacon_crypto::{Ciphertext, FeScheme};

use crate::{
    Ledger, LedgerError, LedgerStore, Round,
    record::{decode_genesis, decode_round, encode_genesis, encode_round},
};

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Round index of a published entry name, `round_{n}.json`.
fn parse_entry_name(name: &str) -> Option<u64> {
    name.strip_prefix("round_")?.strip_suffix(".json")?.parse().ok()
}

/// Ledger stored as a directory of JSON entries.
pub struct DirLedger<S> {
    root: Arc<Path>,
    _scheme: PhantomData<fn() -> S>,
}

impl<S> Clone for DirLedger<S> {
    fn clone(&self) -> Self {
        Self { root: Arc::clone(&self.root), _scheme: PhantomData }
    }
}

impl<S: FeScheme> DirLedger<S> {
    /// Directory holding the entries.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, n: u64) -> PathBuf {
        self.root.join(format!("round_{n}.json"))
    }

    fn has_entry(&self, n: u64) -> Result<bool, LedgerError> {
        Ok(self.entry_path(n).try_exists()?)
    }

    /// List published rounds in one directory pass.
    ///
    /// Returns the highest contiguous round and the first round present
    /// past it, if any. A missing file below published ones is a gap.
    fn scan(&self) -> Result<(u64, Option<u64>), LedgerError> {
        let mut rounds = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            if let Some(n) = entry?.file_name().to_str().and_then(parse_entry_name) {
                rounds.insert(n);
            }
        }

        let mut latest = 0;
        for n in rounds.into_iter().filter(|&n| n > 0) {
            if n != latest + 1 {
                return Ok((latest, Some(n)));
            }
            latest = n;
        }
        Ok((latest, None))
    }

    fn read_entry(&self, n: u64) -> Result<Option<Vec<u8>>, LedgerError> {
        match fs::read(self.entry_path(n)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Exclusively create entry `n` with `bytes`.
    fn publish(&self, n: u64, bytes: &[u8]) -> Result<(), LedgerError> {
        let temp = self.root.join(format!(
            ".round_{n}.{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let written = File::create_new(&temp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        let linked = written.and_then(|()| fs::hard_link(&temp, self.entry_path(n)));
        let _ = fs::remove_file(&temp);

        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(LedgerError::Conflict { round: n })
            },
            Err(e) => Err(e.into()),
        }
    }
}

impl<S: FeScheme> Ledger<S> for DirLedger<S> {
    fn mpk(&self) -> Result<S::PublicKey, LedgerError> {
        let bytes = self.read_entry(0)?.ok_or_else(|| LedgerError::Corrupt {
            round: 0,
            reason: "master public key entry is missing".to_string(),
        })?;

        decode_genesis(&bytes)
    }

    fn round(&self, n: u64) -> Result<Ciphertext<S::Element>, LedgerError> {
        if n == 0 {
            return Err(LedgerError::ReservedRound);
        }

        let bytes = self.read_entry(n)?.ok_or(LedgerError::RoundNotFound { round: n })?;
        decode_round(n, &bytes)
    }

    fn latest(&self) -> Result<Option<Round<S::Element>>, LedgerError> {
        match self.latest_index()? {
            0 => Ok(None),
            index => Ok(Some(Round { index, ciphertext: self.round(index)? })),
        }
    }

    fn latest_index(&self) -> Result<u64, LedgerError> {
        Ok(self.scan()?.0)
    }

    fn check_contiguous(&self) -> Result<(), LedgerError> {
        match self.scan()? {
            (latest, Some(next)) => Err(LedgerError::Gap { missing: latest + 1, next }),
            (_, None) => Ok(()),
        }
    }

    fn append_round(&self, n: u64, ciphertext: &Ciphertext<S::Element>) -> Result<(), LedgerError> {
        let (latest, detached) = self.scan()?;

        if n >= 1 && n <= latest {
            return Err(LedgerError::Conflict { round: n });
        }
        if let Some(next) = detached {
            return Err(LedgerError::Gap { missing: latest + 1, next });
        }
        if n != latest + 1 {
            return Err(LedgerError::OutOfOrder { expected: latest + 1, got: n });
        }

        self.publish(n, &encode_round(ciphertext)?)?;

        tracing::debug!(round = n, root = %self.root.display(), "published round entry");
        Ok(())
    }
}

impl<S: FeScheme> LedgerStore<S> for DirLedger<S> {
    fn initialize(location: &Path, mpk: &S::PublicKey) -> Result<Self, LedgerError> {
        fs::create_dir_all(location)?;

        let ledger = Self { root: Arc::from(location), _scheme: PhantomData };
        match ledger.publish(0, &encode_genesis(mpk)?) {
            Ok(()) => Ok(ledger),
            Err(LedgerError::Conflict { .. }) => {
                Err(LedgerError::AlreadyExists { location: location.to_path_buf() })
            },
            Err(e) => Err(e),
        }
    }

    fn open(location: &Path) -> Result<Self, LedgerError> {
        let metadata = match fs::metadata(location) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LedgerError::NotFound { location: location.to_path_buf() });
            },
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_dir() {
            return Err(LedgerError::NotALedger {
                location: location.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let ledger = Self { root: Arc::from(location), _scheme: PhantomData };
        if !ledger.has_entry(0)? {
            return Err(LedgerError::NotALedger {
                location: location.to_path_buf(),
                reason: "round_0.json is missing".to_string(),
            });
        }

        Ok(ledger)
    }
}
