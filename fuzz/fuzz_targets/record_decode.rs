//! Fuzz target for ledger record decoding
//!
//! Records are read from disk written by other processes; any byte string
//! must decode to a value or a structured `Corrupt` error, never a panic.

#![no_main]

use beacon_crypto::{DdhPublicKey, GroupElement};
use beacon_ledger::record::{decode_genesis, decode_round, encode_round};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_genesis::<DdhPublicKey>(data);

    if let Ok(ciphertext) = decode_round::<GroupElement>(1, data) {
        // Anything accepted must re-encode and decode to the same value
        let bytes = encode_round(&ciphertext).expect("encode accepted ciphertext");
        let again = decode_round::<GroupElement>(1, &bytes).expect("decode re-encoded ciphertext");
        assert_eq!(again, ciphertext);
    }
});
