//! Key generation and signal publishing.

use beacon_crypto::{FeScheme, MasterKey, signal::encrypt_signal};
use beacon_ledger::Ledger;

use crate::{ConfigError, Error, LedgerOp, config::MIN_PARTIES, recipient_index};

/// Output of key generation: the ledger's entry 0 and one key per recipient.
#[derive(Debug, Clone)]
pub struct KeyMaterial<S: FeScheme> {
    /// Master public key
    pub mpk: S::PublicKey,
    /// Recipient keys ordered by index
    pub keys: Vec<S::RecipientKey>,
}

/// Generate key material for `parties` recipients.
///
/// # Errors
///
/// - `Config(TooFewParties)`: `parties < 2`
/// - `Keygen`: the scheme rejected the parameters
pub fn keygen<S: FeScheme>(scheme: &S, parties: usize) -> Result<KeyMaterial<S>, Error> {
    if parties < MIN_PARTIES {
        return Err(ConfigError::TooFewParties { min: MIN_PARTIES, got: parties }.into());
    }

    let (mpk, keys) = scheme.generate_keys(parties).map_err(Error::Keygen)?;

    debug_assert_eq!(keys.len(), parties);
    debug_assert_eq!(mpk.parties(), parties);

    tracing::info!(parties, "generated key material");
    Ok(KeyMaterial { mpk, keys })
}

/// Proof of publication returned to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Round the signal was published as
    pub round: u64,
}

/// Publish one signal addressed to 1-based `party`.
///
/// Reads the latest round, encrypts `e_{party-1}`, combines the two and
/// appends the result as `latest + 1`. On an empty ledger the fresh
/// ciphertext is published on its own.
///
/// # Errors
///
/// - `Config(RecipientOutOfRange)`: `party` not in `[1, L]`
/// - `Ledger` with `Conflict`: another sender published `latest + 1` first;
///   see [`Error::is_conflict`]. Not retried here.
pub fn send_signal<S, L>(scheme: &S, ledger: &L, party: usize) -> Result<Receipt, Error>
where
    S: FeScheme,
    L: Ledger<S>,
{
    let mpk = ledger.mpk().map_err(Error::ledger(LedgerOp::ReadMasterKey))?;
    let recipient = recipient_index(party, mpk.parties())?;

    let latest = ledger.latest().map_err(Error::ledger(LedgerOp::RetrieveLatest))?;
    let signal = encrypt_signal(scheme, &mpk, recipient)
        .map_err(|source| Error::Encrypt { recipient, source })?;

    let (round, ciphertext) = match latest {
        Some(previous) => {
            let combined = previous
                .ciphertext
                .combine(&signal)
                .map_err(|source| Error::Combine { round: previous.index, source })?;
            (previous.index + 1, combined)
        },
        None => (1, signal),
    };

    ledger.append_round(round, &ciphertext).map_err(Error::ledger(LedgerOp::Publish(round)))?;

    tracing::info!(round, "published signal");
    Ok(Receipt { round })
}

#[cfg(test)]
mod tests {
    use beacon_crypto::PlainScheme;
    use beacon_ledger::{LedgerError, MemoryLedger};

    use super::*;

    #[test]
    fn test_keygen_requires_two_parties() {
        let scheme = PlainScheme::new();

        assert_eq!(
            keygen(&scheme, 1).err(),
            Some(Error::Config(ConfigError::TooFewParties { min: 2, got: 1 }))
        );
        assert_eq!(keygen(&scheme, 2).map(|km| km.keys.len()).ok(), Some(2));
    }

    #[test]
    fn test_signals_accumulate() {
        let scheme = PlainScheme::new();
        let material = keygen(&scheme, 3).expect("keygen failed");
        let ledger = MemoryLedger::<PlainScheme>::new(material.mpk.clone());

        assert_eq!(send_signal(&scheme, &ledger, 2), Ok(Receipt { round: 1 }));
        assert_eq!(send_signal(&scheme, &ledger, 2), Ok(Receipt { round: 2 }));
        assert_eq!(send_signal(&scheme, &ledger, 3), Ok(Receipt { round: 3 }));

        let latest = ledger.round(3).expect("round 3");
        let counters: Vec<u64> = material
            .keys
            .iter()
            .map(|key| scheme.decrypt(&material.mpk, key, &latest).expect("decrypt failed"))
            .collect();
        assert_eq!(counters, vec![0, 2, 1]);
    }

    #[test]
    fn test_send_rejects_unknown_party() {
        let scheme = PlainScheme::new();
        let material = keygen(&scheme, 2).expect("keygen failed");
        let ledger = MemoryLedger::<PlainScheme>::new(material.mpk);

        assert_eq!(
            send_signal(&scheme, &ledger, 3),
            Err(Error::Config(ConfigError::RecipientOutOfRange { got: 3, parties: 2 }))
        );
        assert_eq!(ledger.latest_index(), Ok(0));
    }

    #[test]
    fn test_ledger_failure_carries_operation() {
        let scheme = PlainScheme::new();
        let material = keygen(&scheme, 2).expect("keygen failed");
        let ledger = beacon_ledger::ChaoticLedger::new(MemoryLedger::<PlainScheme>::new(material.mpk), 1.0);

        assert_eq!(
            send_signal(&scheme, &ledger, 1),
            Err(Error::Ledger {
                operation: LedgerOp::ReadMasterKey,
                source: LedgerError::Io("chaotic failure injection".to_string()),
            })
        );
    }
}
