//! Combinable ciphertext vectors.
//!
//! A [`Ciphertext`] is an opaque, fixed-length vector over the element type
//! of an FE scheme. Two ciphertexts of equal length combine element-wise, and
//! the scheme guarantees that decryption of the result is the sum of the
//! decryptions of the operands.

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::CiphertextError;

/// A single ciphertext coordinate.
///
/// # Invariants
///
/// - `combine` is associative and commutative
/// - For every recipient key, `decrypt(a.combine(b)) == decrypt(a) +
///   decrypt(b)` when applied coordinate-wise
pub trait CiphertextElement:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Group operation under which decrypted plaintexts add.
    fn combine(&self, other: &Self) -> Self;
}

/// Ciphertext vector as stored in a ledger round.
///
/// Serializes as the record `{ "vector": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ciphertext<E> {
    vector: Vec<E>,
}

impl<E: CiphertextElement> Ciphertext<E> {
    /// Wrap a vector of elements produced by a scheme.
    pub fn new(vector: Vec<E>) -> Self {
        Self { vector }
    }

    /// Number of coordinates.
    pub fn len(&self) -> usize {
        self.vector.len()
    }

    /// Whether the ciphertext has no coordinates.
    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    /// Coordinates in order.
    pub fn elements(&self) -> &[E] {
        &self.vector
    }

    /// Combine two ciphertexts so that their decryptions add.
    ///
    /// Neither operand is modified; the result is a fresh ciphertext.
    ///
    /// # Errors
    ///
    /// - `LengthMismatch`: operands have different lengths
    pub fn combine(&self, other: &Self) -> Result<Self, CiphertextError> {
        if self.vector.len() != other.vector.len() {
            return Err(CiphertextError::LengthMismatch {
                left: self.vector.len(),
                right: other.vector.len(),
            });
        }

        let vector: Vec<E> =
            self.vector.iter().zip(&other.vector).map(|(a, b)| a.combine(b)).collect();

        debug_assert_eq!(vector.len(), self.vector.len());

        Ok(Self { vector })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plain::PlainElement;

    fn ciphertext(values: &[u64]) -> Ciphertext<PlainElement> {
        Ciphertext::new(values.iter().copied().map(PlainElement::new).collect())
    }

    #[test]
    fn test_combine_adds_coordinates() {
        let a = ciphertext(&[1, 0, 2]);
        let b = ciphertext(&[0, 1, 3]);

        let combined = a.combine(&b).expect("combine failed");

        assert_eq!(combined, ciphertext(&[1, 1, 5]));
    }

    #[test]
    fn test_combine_length_mismatch_leaves_operands() {
        let a = ciphertext(&[1, 2, 3]);
        let b = ciphertext(&[1, 2, 3, 4, 5]);

        let result = a.combine(&b);

        assert_eq!(result, Err(CiphertextError::LengthMismatch { left: 3, right: 5 }));
        assert_eq!(a, ciphertext(&[1, 2, 3]));
        assert_eq!(b, ciphertext(&[1, 2, 3, 4, 5]));

        // Both operands remain usable
        assert!(a.combine(&a).is_ok());
        assert!(b.combine(&b).is_ok());
    }

    #[test]
    fn test_combine_is_commutative() {
        let a = ciphertext(&[4, 0, 9]);
        let b = ciphertext(&[1, 7, 0]);

        assert_eq!(a.combine(&b).expect("combine failed"), b.combine(&a).expect("combine failed"));
    }

    #[test]
    fn test_record_layout() {
        let json = serde_json::to_value(ciphertext(&[10, 0])).expect("serialize failed");
        assert_eq!(json, serde_json::json!({ "vector": ["10", "0"] }));
    }
}
