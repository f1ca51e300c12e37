//! Beacon Cryptographic Primitives
//!
//! The functional-encryption layer underneath the Beacon signal ledger. A
//! sender encrypts a unit vector `e_j` addressed to recipient `j`; ciphertexts
//! combine element-wise so that the decrypted value of a combined ciphertext
//! is the sum of the decrypted values of its parts. Each recipient holds a
//! capability that decrypts only its own coordinate.
//!
//! # Layering
//!
//! ```text
//! FeScheme (trait)
//!        │
//!        ├── DdhScheme   DDH inner-product FE over Ristretto255
//!        └── PlainScheme plaintext mock for tests
//!        │
//!        ▼
//! Ciphertext<E> ── combine ──▶ Ciphertext<E>
//!        │
//!        ▼
//! signal::encrypt_signal(e_j)
//! ```
//!
//! Everything that touches the ledger is generic over [`FeScheme`], so the
//! ledger and search code never depend on a specific number-theoretic
//! construction.
//!
//! # Security
//!
//! - A recipient key for index `j` reveals `<x, e_j>` and nothing about the
//!   other coordinates of the plaintext.
//! - Decryption recovers a discrete logarithm, so counters are only
//!   recoverable up to the bound fixed in the master public key.
//! - [`PlainScheme`] provides no confidentiality at all and exists for tests
//!   and simulation only.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod ciphertext;
pub mod ddh;
mod error;
pub mod plain;
mod scheme;
pub mod signal;

pub use ciphertext::{Ciphertext, CiphertextElement};
pub use ddh::{DEFAULT_BOUND, DdhPublicKey, DdhRecipientKey, DdhScheme, GroupElement, MAX_BOUND};
pub use error::{CiphertextError, CryptoError};
pub use plain::{PlainElement, PlainPublicKey, PlainRecipientKey, PlainScheme};
pub use scheme::{FeScheme, MasterKey, RecipientCapability};
