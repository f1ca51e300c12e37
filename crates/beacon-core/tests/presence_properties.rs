//! Property tests for Presence Search and Search Session.
//!
//! Presence Search is checked exhaustively against every `(t1, t2)` pair of
//! small random step sequences. Search Session is checked against the rounds
//! a model ledger knows each recipient was signaled in.

use beacon_core::{Error, RoundRange, SearchSession, find_last_unchanged, keygen, send_signal};
use beacon_crypto::{FeScheme, MasterKey, PlainScheme};
use beacon_ledger::{Ledger, MemoryLedger};
use proptest::prelude::*;

/// Counter sequence with `v(0) == 0` and `v(t) - v(t - 1) == steps[t - 1]`.
fn prefix_sums(steps: &[u64]) -> Vec<u64> {
    let mut values = vec![0];
    for step in steps {
        values.push(values[values.len() - 1] + step);
    }
    values
}

fn ceil_log2(n: u64) -> usize {
    if n <= 1 { 0 } else { (64 - (n - 1).leading_zeros()) as usize }
}

proptest! {
    #[test]
    fn prop_presence_search_finds_last_unchanged_round(
        steps in prop::collection::vec(prop_oneof![3 => Just(0u64), 1 => 1u64..3], 1..40),
    ) {
        let values = prefix_sums(&steps);
        let last = values.len() as u64 - 1;

        for t1 in 0..last {
            for t2 in (t1 + 1)..=last {
                let (v1, v2) = (values[t1 as usize], values[t2 as usize]);
                if v1 == v2 {
                    continue;
                }

                let mut queries = 0usize;
                let found = find_last_unchanged(
                    |t| {
                        queries += 1;
                        Ok::<_, Error>(values[t as usize])
                    },
                    t1,
                    v1,
                    t2,
                )
                .expect("search failed");

                // ORACLE: largest t in [t1, t2] with v(t) == v(t1)
                let expected = (t1..=t2).filter(|&t| values[t as usize] == v1).max();
                prop_assert_eq!(Some(found), expected);
                prop_assert!(values[found as usize + 1] != v1);
                prop_assert!(queries <= ceil_log2(t2 - t1 + 1));
            }
        }
    }

    #[test]
    fn prop_session_reports_exactly_the_signaled_rounds(
        recipients in 2usize..5,
        picks in prop::collection::vec(0usize..5, 0..48),
        party in 1usize..5,
        bounds in (0u64..48, 0u64..48),
    ) {
        let party = (party - 1) % recipients + 1;
        let scheme = PlainScheme::new();
        let material = keygen(&scheme, recipients).expect("keygen failed");
        let ledger = MemoryLedger::<PlainScheme>::new(material.mpk.clone());

        let sent: Vec<usize> = picks.iter().map(|pick| pick % recipients + 1).collect();
        for &addressee in &sent {
            send_signal(&scheme, &ledger, addressee).expect("send failed");
        }

        let latest = ledger.latest_index().expect("latest");
        let from = bounds.0.min(bounds.1).min(latest);
        let to = bounds.0.max(bounds.1).min(latest);

        let mut session = SearchSession::new(
            scheme.clone(),
            ledger.clone(),
            material.keys[party - 1].clone(),
        )
        .expect("session");
        let report = session.run(RoundRange::between(from, to)).expect("search");

        // ORACLE: rounds in (from, to] whose signal was addressed to `party`
        let expected: Vec<u64> = sent
            .iter()
            .enumerate()
            .map(|(i, &addressee)| (i as u64 + 1, addressee))
            .filter(|&(round, addressee)| round > from && round <= to && addressee == party)
            .map(|(round, _)| round)
            .collect();
        let found: Vec<u64> = report.events.iter().map(|event| event.round).collect();
        prop_assert_eq!(&found, &expected);

        // Counters at events increase by one each
        for pair in report.events.windows(2) {
            prop_assert_eq!(pair[1].counter, pair[0].counter + 1);
        }

        let span = (to - from).max(1);
        let budget = 2 + expected.len() * (ceil_log2(span + 1) + 1);
        prop_assert!(report.decryptions <= budget, "{} > {}", report.decryptions, budget);
        prop_assert_eq!(material.mpk.parties(), recipients);
    }

    #[test]
    fn prop_counters_are_monotonic(picks in prop::collection::vec(0usize..3, 1..32)) {
        let scheme = PlainScheme::new();
        let material = keygen(&scheme, 3).expect("keygen failed");
        let ledger = MemoryLedger::<PlainScheme>::new(material.mpk.clone());
        for pick in &picks {
            send_signal(&scheme, &ledger, pick + 1).expect("send failed");
        }

        for key in &material.keys {
            let mut previous = 0;
            for n in 1..=picks.len() as u64 {
                let ct = ledger.round(n).expect("round");
                let value = scheme.decrypt(&material.mpk, key, &ct).expect("decrypt");
                prop_assert!(value >= previous);
                prop_assert!(value - previous <= 1);
                previous = value;
            }
        }
    }
}
