//! Ledger audit.
//!
//! Walks every published round and checks that it decodes and has the
//! ciphertext length implied by the master public key, then that no round is
//! present past the latest one (a deleted entry leaves such a gap).
//! Reordered or deleted-and-replaced entries are not detectable without
//! decryption keys.

use beacon_crypto::{FeScheme, MasterKey};
use beacon_ledger::Ledger;

use crate::{Error, LedgerOp};

/// Summary of a successful audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditReport {
    /// Number of published rounds
    pub rounds: u64,
    /// Number of recipients in the master public key
    pub parties: usize,
    /// Ciphertext length every round was checked against
    pub ciphertext_len: usize,
}

/// Check every round of `ledger`.
///
/// # Errors
///
/// - `Ledger` with `RetrieveRound(n)`: round `n` corrupt
/// - `MalformedRound`: round has the wrong ciphertext length
/// - `Ledger` with `CheckContiguity`: rounds published past a missing one
pub fn audit<S, L>(scheme: &S, ledger: &L) -> Result<AuditReport, Error>
where
    S: FeScheme,
    L: Ledger<S>,
{
    let mpk = ledger.mpk().map_err(Error::ledger(LedgerOp::ReadMasterKey))?;
    let expected = scheme.ciphertext_len(&mpk);
    let rounds = ledger.latest_index().map_err(Error::ledger(LedgerOp::RetrieveLatest))?;

    for n in 1..=rounds {
        let ciphertext = ledger.round(n).map_err(Error::ledger(LedgerOp::RetrieveRound(n)))?;
        if ciphertext.len() != expected {
            return Err(Error::MalformedRound { round: n, expected, actual: ciphertext.len() });
        }
    }
    ledger.check_contiguous().map_err(Error::ledger(LedgerOp::CheckContiguity))?;

    tracing::info!(rounds, parties = mpk.parties(), "ledger audit passed");
    Ok(AuditReport { rounds, parties: mpk.parties(), ciphertext_len: expected })
}

#[cfg(test)]
mod tests {
    use beacon_crypto::{Ciphertext, PlainElement, PlainScheme};
    use beacon_ledger::{DirLedger, LedgerError, LedgerStore, MemoryLedger};
    use tempfile::TempDir;

    use super::*;
    use crate::{keygen, send_signal};

    #[test]
    fn test_clean_ledger_passes() {
        let scheme = PlainScheme::new();
        let material = keygen(&scheme, 3).expect("keygen failed");
        let ledger = MemoryLedger::<PlainScheme>::new(material.mpk);
        for party in [1, 3, 2, 2] {
            send_signal(&scheme, &ledger, party).expect("send failed");
        }

        assert_eq!(
            audit(&scheme, &ledger),
            Ok(AuditReport { rounds: 4, parties: 3, ciphertext_len: 3 })
        );
    }

    #[test]
    fn test_wrong_length_round_is_flagged() {
        let scheme = PlainScheme::new();
        let material = keygen(&scheme, 3).expect("keygen failed");
        let ledger = MemoryLedger::<PlainScheme>::new(material.mpk);
        send_signal(&scheme, &ledger, 1).expect("send failed");
        ledger
            .append_round(2, &Ciphertext::new(vec![PlainElement::new(1); 5]))
            .expect("append failed");

        assert_eq!(
            audit(&scheme, &ledger),
            Err(Error::MalformedRound { round: 2, expected: 3, actual: 5 })
        );
    }

    #[test]
    fn test_deleted_round_is_reported_as_gap() {
        let dir = TempDir::new().expect("tempdir");
        let scheme = PlainScheme::new();
        let material = keygen(&scheme, 2).expect("keygen failed");
        let ledger = DirLedger::<PlainScheme>::initialize(&dir.path().join("repo"), &material.mpk)
            .expect("initialize failed");
        for party in [1, 2, 1, 2, 2] {
            send_signal(&scheme, &ledger, party).expect("send failed");
        }
        std::fs::remove_file(ledger.root().join("round_3.json")).expect("remove");

        assert_eq!(
            audit(&scheme, &ledger),
            Err(Error::Ledger {
                operation: LedgerOp::CheckContiguity,
                source: LedgerError::Gap { missing: 3, next: 4 },
            })
        );
        assert!(send_signal(&scheme, &ledger, 1).is_err());
    }
}
