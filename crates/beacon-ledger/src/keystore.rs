//! Recipient key store.
//!
//! One file per party, `party_{j}.json` for the 1-based party `j`, holding
//! the recipient key record `{ "index": j - 1, "derivedKey": ... }`. Files
//! are created exclusively and, on Unix, readable by the owner only.
//!
//! A full key set can be staged in a sibling directory and renamed into place
//! in one step, so a stand never ends up with only some of its keys.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use beacon_crypto::RecipientCapability;

use crate::KeyStoreError;

/// Directory of recipient key files.
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// Key store rooted at `dir`. Nothing is touched until a save or load.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for 1-based `party`.
    pub fn path(&self, party: usize) -> PathBuf {
        self.dir.join(format!("party_{party}.json"))
    }

    /// Persist every key, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: a key file is already present; earlier keys in
    ///   `keys` remain written
    pub fn save_all<K: RecipientCapability>(&self, keys: &[K]) -> Result<Vec<PathBuf>, KeyStoreError> {
        fs::create_dir_all(&self.dir)?;
        keys.iter().map(|key| self.save(key)).collect()
    }

    /// Write every key into a private staging directory next to `dir`.
    ///
    /// Nothing appears under `dir` until [`StagedKeys::commit`]. Dropping the
    /// staged set without committing removes it.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: `dir` already holds files
    pub fn stage_all<K: RecipientCapability>(&self, keys: &[K]) -> Result<StagedKeys, KeyStoreError> {
        if fs::read_dir(&self.dir).is_ok_and(|mut entries| entries.next().is_some()) {
            return Err(KeyStoreError::AlreadyExists { path: self.dir.clone() });
        }

        let name = self.dir.file_name().map_or_else(|| "keys".into(), |n| n.to_string_lossy());
        let staging = self.dir.with_file_name(format!(".{name}.staging.{}", std::process::id()));
        if let Some(parent) = staging.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::create_dir(&staging)?;

        let staged = StagedKeys {
            staging: KeyStore::new(staging),
            target: self.clone(),
            parties: keys.iter().map(|key| key.index() + 1).collect(),
        };
        for key in keys {
            staged.staging.save(key)?;
        }
        Ok(staged)
    }

    /// Persist one key under `party_{index + 1}.json`.
    pub fn save<K: RecipientCapability>(&self, key: &K) -> Result<PathBuf, KeyStoreError> {
        let path = self.path(key.index() + 1);
        let bytes = serde_json::to_vec_pretty(key).map_err(|e| KeyStoreError::Io(e.to_string()))?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = match options.open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(KeyStoreError::AlreadyExists { path });
            },
            Err(e) => return Err(e.into()),
        };
        file.write_all(&bytes)?;
        file.sync_all()?;

        tracing::debug!(party = key.index() + 1, path = %path.display(), "saved recipient key");
        Ok(path)
    }

    /// Load the key for 1-based `party`.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no key file for `party`
    /// - `Corrupt`: file is not a key record
    /// - `IndexMismatch`: file holds a key for another recipient
    pub fn load<K: RecipientCapability>(&self, party: usize) -> Result<K, KeyStoreError> {
        let path = self.path(party);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(KeyStoreError::NotFound { party, path });
            },
            Err(e) => return Err(e.into()),
        };

        let key: K = serde_json::from_slice(&bytes)
            .map_err(|e| KeyStoreError::Corrupt { path, reason: e.to_string() })?;

        if key.index() + 1 != party {
            return Err(KeyStoreError::IndexMismatch { party, stored: key.index() });
        }

        Ok(key)
    }
}

/// Key set written but not yet visible in its key store.
#[derive(Debug)]
pub struct StagedKeys {
    staging: KeyStore,
    target: KeyStore,
    parties: Vec<usize>,
}

impl StagedKeys {
    /// Move the staged keys into place, returning the final key paths.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: the target directory was populated meanwhile
    pub fn commit(self) -> Result<Vec<PathBuf>, KeyStoreError> {
        match fs::rename(self.staging.dir(), self.target.dir()) {
            Ok(()) => {},
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::DirectoryNotEmpty
                ) =>
            {
                return Err(KeyStoreError::AlreadyExists { path: self.target.dir().to_path_buf() });
            },
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(keys = self.parties.len(), dir = %self.target.dir().display(), "committed key set");
        Ok(self.parties.iter().map(|&party| self.target.path(party)).collect())
    }
}

impl Drop for StagedKeys {
    fn drop(&mut self) {
        // Gone already after a successful commit
        let _ = fs::remove_dir_all(self.staging.dir());
    }
}

#[cfg(test)]
mod tests {
    use beacon_crypto::{FeScheme, PlainRecipientKey, PlainScheme};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().expect("tempdir");
        let store = KeyStore::new(dir.path().join("parties"));
        let (_, keys) = PlainScheme::new().generate_keys(3).expect("keygen failed");

        let paths = store.save_all(&keys).expect("save failed");

        assert_eq!(paths[2], dir.path().join("parties").join("party_3.json"));
        for (party, key) in (1..=3).zip(&keys) {
            assert_eq!(store.load::<PlainRecipientKey>(party).as_ref(), Ok(key));
        }
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let dir = TempDir::new().expect("tempdir");
        let store = KeyStore::new(dir.path());
        store.save(&PlainRecipientKey::new(0)).expect("save failed");

        let result = store.save(&PlainRecipientKey::new(0));

        assert_eq!(result, Err(KeyStoreError::AlreadyExists { path: store.path(1) }));
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().expect("tempdir");
        let store = KeyStore::new(dir.path());

        assert_eq!(
            store.load::<PlainRecipientKey>(4),
            Err(KeyStoreError::NotFound { party: 4, path: store.path(4) })
        );

        fs::write(store.path(1), b"{\"index\": 1}").expect("write");
        assert_eq!(
            store.load::<PlainRecipientKey>(1),
            Err(KeyStoreError::IndexMismatch { party: 1, stored: 1 })
        );

        fs::write(store.path(2), b"not json").expect("write");
        assert!(matches!(
            store.load::<PlainRecipientKey>(2),
            Err(KeyStoreError::Corrupt { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_key_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("tempdir");
        let store = KeyStore::new(dir.path());

        let path = store.save(&PlainRecipientKey::new(0)).expect("save failed");

        let mode = fs::metadata(path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .expect("read_dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains("staging"))
            .collect()
    }

    #[test]
    fn test_staged_keys_appear_only_on_commit() {
        let dir = TempDir::new().expect("tempdir");
        let store = KeyStore::new(dir.path().join("parties"));
        let (_, keys) = PlainScheme::new().generate_keys(3).expect("keygen failed");

        let staged = store.stage_all(&keys).expect("stage failed");
        assert!(!store.dir().exists());

        let paths = staged.commit().expect("commit failed");

        assert_eq!(paths, vec![store.path(1), store.path(2), store.path(3)]);
        assert_eq!(store.load::<PlainRecipientKey>(2).as_ref(), Ok(&keys[1]));
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let store = KeyStore::new(dir.path().join("parties"));
        let (_, keys) = PlainScheme::new().generate_keys(2).expect("keygen failed");

        drop(store.stage_all(&keys).expect("stage failed"));

        assert!(!store.dir().exists());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_stage_refuses_populated_store() {
        let dir = TempDir::new().expect("tempdir");
        let store = KeyStore::new(dir.path().join("parties"));
        store.save_all(&[PlainRecipientKey::new(0)]).expect("save failed");

        let result = store.stage_all(&[PlainRecipientKey::new(0), PlainRecipientKey::new(1)]);

        assert_eq!(result.err(), Some(KeyStoreError::AlreadyExists { path: store.dir().to_path_buf() }));
        assert!(leftovers(dir.path()).is_empty());
    }
}
