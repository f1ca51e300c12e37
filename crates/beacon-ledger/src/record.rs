//! Ledger entry records.
//!
//! Entry 0 is `{ "mpk": ... }`; every entry `n >= 1` is a ciphertext record
//! `{ "vector": [...] }`. The directory backend stores these as JSON, one
//! file per entry.

use beacon_crypto::{Ciphertext, CiphertextElement, MasterKey};
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// A published round: index `n >= 1` and its combined ciphertext.
#[derive(Debug, Clone, PartialEq)]
pub struct Round<E> {
    /// Round index
    pub index: u64,
    /// Cumulative ciphertext as of this round
    pub ciphertext: Ciphertext<E>,
}

/// Entry 0 record.
#[derive(Serialize, Deserialize)]
pub(crate) struct GenesisRecord<K> {
    pub(crate) mpk: K,
}

/// Encode the master public key entry.
pub fn encode_genesis<K: MasterKey>(mpk: &K) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(&GenesisRecord { mpk }).map_err(|e| LedgerError::Io(e.to_string()))
}

/// Decode the master public key entry.
///
/// # Errors
///
/// - `Corrupt { round: 0 }`: bytes are not a genesis record for `K`
pub fn decode_genesis<K: MasterKey>(bytes: &[u8]) -> Result<K, LedgerError> {
    serde_json::from_slice::<GenesisRecord<K>>(bytes)
        .map(|record| record.mpk)
        .map_err(|e| LedgerError::Corrupt { round: 0, reason: e.to_string() })
}

/// Encode a round entry.
pub fn encode_round<E: CiphertextElement>(ciphertext: &Ciphertext<E>) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(ciphertext).map_err(|e| LedgerError::Io(e.to_string()))
}

/// Decode round `round`'s entry.
///
/// # Errors
///
/// - `Corrupt { round }`: bytes are not a ciphertext record over `E`
pub fn decode_round<E: CiphertextElement>(round: u64, bytes: &[u8]) -> Result<Ciphertext<E>, LedgerError> {
    serde_json::from_slice(bytes).map_err(|e| LedgerError::Corrupt { round, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use beacon_crypto::{FeScheme, PlainElement, PlainPublicKey, PlainScheme};

    use super::*;

    #[test]
    fn test_genesis_layout() {
        let (mpk, _) = PlainScheme::new().generate_keys(3).expect("keygen failed");

        let bytes = encode_genesis(&mpk).expect("encode failed");
        let json: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");

        assert_eq!(json, serde_json::json!({ "mpk": { "parties": 3 } }));
        assert_eq!(decode_genesis::<PlainPublicKey>(&bytes), Ok(mpk));
    }

    #[test]
    fn test_decode_round_reports_index() {
        let result = decode_round::<PlainElement>(7, b"{\"vector\": [1, 2]}");

        match result {
            Err(LedgerError::Corrupt { round, .. }) => assert_eq!(round, 7),
            other => panic!("expected corrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_genesis_rejects_round_record() {
        let result = decode_genesis::<PlainPublicKey>(b"{\"vector\": [\"1\"]}");
        assert!(matches!(result, Err(LedgerError::Corrupt { round: 0, .. })));
    }
}
