//! End-to-end scenarios over the production scheme and the on-disk ledgers.

use std::path::Path;

use beacon_core::{
    ConfigError, Error, LedgerOp, RoundRange, SearchSession, audit, initialize_ledger, keygen,
    open_ledger, send_signal,
};
use beacon_crypto::{
    Ciphertext, DdhRecipientKey, DdhScheme, FeScheme, GroupElement, PlainElement, PlainScheme,
};
use beacon_ledger::{
    DirLedger, KeyStore, Ledger, LedgerError, LedgerStore, MemoryLedger, RedbLedger, Round,
};
use tempfile::TempDir;

fn rounds(session: &mut SearchSession<DdhScheme, impl Ledger<DdhScheme>>, range: RoundRange) -> Vec<u64> {
    session.run(range).expect("search failed").events.iter().map(|event| event.round).collect()
}

/// keygen 3, party 2 signaled in round 1, party 1 in round 2.
fn three_party_scenario<L: LedgerStore<DdhScheme>>(location: &Path, keys_dir: &Path) {
    let scheme = DdhScheme::with_bound(64);

    let material = keygen(&scheme, 3).expect("keygen failed");
    let ledger = initialize_ledger::<DdhScheme, L>(location, &material.mpk).expect("initialize failed");
    KeyStore::new(keys_dir).save_all(&material.keys).expect("save keys failed");
    assert_eq!(ledger.latest_index(), Ok(0));

    assert_eq!(send_signal(&scheme, &ledger, 2).map(|r| r.round), Ok(1));
    assert_eq!(send_signal(&scheme, &ledger, 1).map(|r| r.round), Ok(2));

    // Round 1 = Encrypt(e_1); round 2 = Combine(Encrypt(e_0), round 1)
    let store = KeyStore::new(keys_dir);
    let key = |party| store.load::<DdhRecipientKey>(party).expect("load key failed");
    let round1 = ledger.round(1).expect("round 1");
    let round2 = ledger.round(2).expect("round 2");
    let decrypt =
        |party, ct: &Ciphertext<GroupElement>| scheme.decrypt(&material.mpk, &key(party), ct);
    assert_eq!([decrypt(1, &round1), decrypt(2, &round1), decrypt(3, &round1)], [Ok(0), Ok(1), Ok(0)]);
    assert_eq!([decrypt(1, &round2), decrypt(2, &round2), decrypt(3, &round2)], [Ok(1), Ok(1), Ok(0)]);

    let mut session = SearchSession::new(scheme.clone(), ledger.clone(), key(2)).expect("session");
    assert_eq!(rounds(&mut session, RoundRange::since(0)), vec![1]);
    assert_eq!(rounds(&mut session, RoundRange::between(1, 2)), Vec::<u64>::new());

    let mut session = SearchSession::new(scheme.clone(), ledger.clone(), key(1)).expect("session");
    assert_eq!(rounds(&mut session, RoundRange::since(0)), vec![2]);

    let mut session = SearchSession::new(scheme, ledger, key(3)).expect("session");
    assert_eq!(rounds(&mut session, RoundRange::since(0)), Vec::<u64>::new());
}

#[test]
fn three_party_scenario_on_directory_ledger() {
    let dir = TempDir::new().expect("tempdir");
    three_party_scenario::<DirLedger<DdhScheme>>(&dir.path().join("repo"), &dir.path().join("parties"));

    // A second process attaching later sees the same ledger
    let ledger = open_ledger::<DdhScheme, DirLedger<DdhScheme>>(&dir.path().join("repo"))
        .expect("open failed");
    assert_eq!(ledger.latest_index(), Ok(2));
    assert_eq!(audit(&DdhScheme::with_bound(64), &ledger).map(|r| r.ciphertext_len), Ok(4));
}

#[test]
fn three_party_scenario_on_redb_ledger() {
    let dir = TempDir::new().expect("tempdir");
    three_party_scenario::<RedbLedger<DdhScheme>>(
        &dir.path().join("ledger.redb"),
        &dir.path().join("parties"),
    );
}

#[test]
fn many_signals_found_with_few_decryptions() {
    let scheme = PlainScheme::new();
    let material = keygen(&scheme, 4).expect("keygen failed");
    let ledger = MemoryLedger::<PlainScheme>::new(material.mpk.clone());

    // Party 4 signaled at rounds 100, 300, 700 out of 1000
    for round in 1..=1000u64 {
        let party = if [100, 300, 700].contains(&round) { 4 } else { (round % 3 + 1) as usize };
        send_signal(&scheme, &ledger, party).expect("send failed");
    }

    let mut session =
        SearchSession::new(scheme.clone(), ledger, material.keys[3].clone()).expect("session");
    let report = session.run(RoundRange::since(0)).expect("search failed");

    let found: Vec<u64> = report.events.iter().map(|event| event.round).collect();
    assert_eq!(found, vec![100, 300, 700]);
    assert!(report.decryptions <= 2 + 3 * 11, "{} decryptions", report.decryptions);
}

#[test]
fn initialize_refuses_existing_ledger() {
    let dir = TempDir::new().expect("tempdir");
    let scheme = PlainScheme::new();
    let material = keygen(&scheme, 2).expect("keygen failed");
    let location = dir.path().join("repo");

    initialize_ledger::<PlainScheme, DirLedger<PlainScheme>>(&location, &material.mpk)
        .expect("first initialize failed");
    let second = initialize_ledger::<PlainScheme, DirLedger<PlainScheme>>(&location, &material.mpk);

    assert_eq!(
        second.err(),
        Some(Error::Ledger {
            operation: LedgerOp::Initialize,
            source: LedgerError::AlreadyExists { location },
        })
    );
}

#[test]
fn open_reports_missing_ledger() {
    let dir = TempDir::new().expect("tempdir");
    let location = dir.path().join("repo");

    let result = open_ledger::<PlainScheme, DirLedger<PlainScheme>>(&location);

    assert_eq!(
        result.err(),
        Some(Error::Ledger { operation: LedgerOp::Open, source: LedgerError::NotFound { location } })
    );
}

/// Ledger whose every append races against another sender that wins.
#[derive(Clone)]
struct LosingRace {
    inner: MemoryLedger<PlainScheme>,
}

impl Ledger<PlainScheme> for LosingRace {
    fn mpk(&self) -> Result<<PlainScheme as FeScheme>::PublicKey, LedgerError> {
        self.inner.mpk()
    }

    fn round(&self, n: u64) -> Result<Ciphertext<PlainElement>, LedgerError> {
        self.inner.round(n)
    }

    fn latest(&self) -> Result<Option<Round<PlainElement>>, LedgerError> {
        self.inner.latest()
    }

    fn append_round(
        &self,
        n: u64,
        ciphertext: &Ciphertext<PlainElement>,
    ) -> Result<(), LedgerError> {
        self.inner.append_round(n, ciphertext)?;
        self.inner.append_round(n, ciphertext)
    }
}

#[test]
fn conflicts_surface_without_retry() {
    let scheme = PlainScheme::new();
    let material = keygen(&scheme, 2).expect("keygen failed");
    let racing = LosingRace { inner: MemoryLedger::new(material.mpk) };

    let err = send_signal(&scheme, &racing, 1).expect_err("append should lose the race");

    assert!(err.is_conflict());
    assert_eq!(
        err,
        Error::Ledger { operation: LedgerOp::Publish(1), source: LedgerError::Conflict { round: 1 } }
    );
    assert_eq!(racing.inner.latest_index(), Ok(1));
}

#[test]
fn send_rejects_party_zero() {
    let scheme = PlainScheme::new();
    let material = keygen(&scheme, 2).expect("keygen failed");
    let ledger = MemoryLedger::<PlainScheme>::new(material.mpk);

    let result = send_signal(&scheme, &ledger, 0);

    assert_eq!(
        result.err(),
        Some(Error::Config(ConfigError::RecipientOutOfRange { got: 0, parties: 2 }))
    );
}
