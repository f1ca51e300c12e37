//! Hex encodings for Ristretto points and scalars.
//!
//! Both use the canonical 32-byte encoding. Non-canonical or off-curve input
//! is rejected at deserialization so a corrupt record never becomes a group
//! element.

use curve25519_dalek::{RistrettoPoint, Scalar, ristretto::CompressedRistretto};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ciphertext::CiphertextElement;

/// Ristretto255 group element used as a ciphertext coordinate and as a
/// public-key generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupElement(RistrettoPoint);

impl GroupElement {
    pub(crate) fn new(point: RistrettoPoint) -> Self {
        Self(point)
    }

    /// The underlying group element.
    pub fn point(&self) -> RistrettoPoint {
        self.0
    }
}

impl CiphertextElement for GroupElement {
    fn combine(&self, other: &Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Serialize for GroupElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0.compress().as_bytes()))
    }
}

impl<'de> Deserialize<'de> for GroupElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = decode_32(&text).map_err(serde::de::Error::custom)?;
        CompressedRistretto(bytes)
            .decompress()
            .map(Self)
            .ok_or_else(|| serde::de::Error::custom("not a valid ristretto255 encoding"))
    }
}

fn decode_32(text: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(text).map_err(|e| e.to_string())?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| format!("expected 32 bytes, got {}", bytes.len()))
}

/// `serde(with)` adapter for canonical scalars.
pub(crate) mod scalar_hex {
    use super::{Deserialize, Deserializer, Scalar, Serializer, decode_32};

    pub(crate) fn serialize<S: Serializer>(scalar: &Scalar, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(scalar.as_bytes()))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Scalar, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = decode_32(&text).map_err(serde::de::Error::custom)?;
        Option::<Scalar>::from(Scalar::from_canonical_bytes(bytes))
            .ok_or_else(|| serde::de::Error::custom("scalar is not canonical"))
    }
}
