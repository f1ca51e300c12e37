//! Bounded discrete logarithm by baby-step giant-step.

use std::collections::HashMap;

use curve25519_dalek::{RistrettoPoint, constants::RISTRETTO_BASEPOINT_POINT, traits::Identity};

/// Precomputed baby steps `{ j·G : 0 <= j < m }` for a fixed bound.
///
/// Solving costs at most `m` point subtractions, where `m = isqrt(bound + 1) + 1`.
pub(crate) struct BabySteps {
    bound: u64,
    step: u64,
    table: HashMap<[u8; 32], u64>,
    giant: RistrettoPoint,
}

impl BabySteps {
    pub(crate) fn new(bound: u64) -> Self {
        let step = bound.saturating_add(1).isqrt() + 1;
        let mut table = HashMap::with_capacity(step as usize);
        let mut point = RistrettoPoint::identity();

        for j in 0..step {
            table.insert(point.compress().to_bytes(), j);
            point += RISTRETTO_BASEPOINT_POINT;
        }

        // point == step·G
        Self { bound, step, table, giant: point }
    }

    pub(crate) fn bound(&self) -> u64 {
        self.bound
    }

    /// Find `x <= bound` with `x·G == target`.
    pub(crate) fn solve(&self, target: RistrettoPoint) -> Option<u64> {
        let mut current = target;

        for i in 0..self.step {
            if let Some(&j) = self.table.get(&current.compress().to_bytes()) {
                let value = i * self.step + j;
                return (value <= self.bound).then_some(value);
            }
            current -= self.giant;
        }

        None
    }
}
