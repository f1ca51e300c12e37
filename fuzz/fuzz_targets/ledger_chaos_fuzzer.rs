//! Fuzz target for signaling and searching under ledger failures
//!
//! Sends go through a `ChaoticLedger` that fails a configurable share of
//! operations. Failed sends are recorded as not sent.
//!
//! # Invariants
//!
//! - Failures surface as `Err`, never as panics
//! - The ledger stays gapless: successful sends land at consecutive rounds
//! - A search over the reliable ledger finds exactly the successful sends

#![no_main]

use arbitrary::Arbitrary;
use beacon_core::{RoundRange, SearchSession, keygen, send_signal};
use beacon_crypto::{PlainScheme, RecipientCapability};
use beacon_ledger::{ChaoticLedger, Ledger, MemoryLedger};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Scenario {
    chaos_seed: u64,
    /// Failure rate 0-9 maps to 0%-90%
    failure_rate_tenth: u8,
    /// Party count minus two, clamped to 0-4
    extra_parties: u8,
    /// Recipient picks, taken modulo the party count
    sends: Vec<u8>,
}

fuzz_target!(|scenario: Scenario| {
    let parties = 2 + usize::from(scenario.extra_parties % 5);
    let rate = f64::from(scenario.failure_rate_tenth % 10) / 10.0;

    let scheme = PlainScheme::new();
    let material = keygen(&scheme, parties).expect("keygen with at least two parties");
    let reliable = MemoryLedger::<PlainScheme>::new(material.mpk.clone());
    let chaotic = ChaoticLedger::with_seed(reliable.clone(), rate, scenario.chaos_seed);

    let mut delivered = Vec::new();
    for pick in scenario.sends.iter().take(64) {
        let party = usize::from(*pick) % parties + 1;
        if let Ok(receipt) = send_signal(&scheme, &chaotic, party) {
            delivered.push((receipt.round, party));
        }
    }

    for (i, (round, _)) in delivered.iter().enumerate() {
        assert_eq!(*round, i as u64 + 1);
    }
    assert_eq!(Ledger::<PlainScheme>::latest_index(&reliable), Ok(delivered.len() as u64));

    for key in material.keys {
        let party = key.index() + 1;
        let mut session = SearchSession::new(scheme.clone(), reliable.clone(), key)
            .expect("session over reliable ledger");
        let report = session.run(RoundRange::since(0)).expect("search over reliable ledger");

        let found: Vec<u64> = report.events.iter().map(|event| event.round).collect();
        let expected: Vec<u64> =
            delivered.iter().filter(|(_, p)| *p == party).map(|(round, _)| *round).collect();
        assert_eq!(found, expected);
    }
});
