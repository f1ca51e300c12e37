//! Beacon Core
//!
//! Operations on top of the FE contract and the round ledger:
//!
//! - [`keygen`]: key material for `L >= 2` recipients
//! - [`send_signal`]: encrypt `e_j`, combine with the latest round, append
//! - [`find_last_unchanged`]: Presence Search over a counter sequence
//! - [`SearchSession`]: every signal a recipient received in a range
//! - [`audit`]: structural check of every published round
//!
//! # Search cost
//!
//! ```text
//! counter v_i(t)   0 0 0 1 1 1 1 2 2 2
//! round t          0 1 2 3 4 5 6 7 8 9
//!                        ^       ^
//!                        events at 3 and 7
//! ```
//!
//! Finding `k` events in `[t1, t2]` costs `O(k · log(t2 - t1))` decryptions
//! instead of `t2 - t1` for a linear scan.
//!
//! Everything is generic over [`FeScheme`](beacon_crypto::FeScheme) and
//! [`Ledger`](beacon_ledger::Ledger). Nothing here retries: a lost append race
//! surfaces as an error with [`Error::is_conflict`] set, and the caller picks
//! the retry policy.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod audit;
mod config;
mod error;
mod presence;
mod session;
mod signal;
mod stand;

pub use audit::{AuditReport, audit};
pub use config::{MIN_PARTIES, RoundRange, recipient_index};
pub use error::{ConfigError, Error, LedgerOp};
pub use presence::find_last_unchanged;
pub use session::{SearchReport, SearchSession, SignalEvent};
pub use signal::{KeyMaterial, Receipt, keygen, send_signal};
pub use stand::{initialize_ledger, open_ledger};
