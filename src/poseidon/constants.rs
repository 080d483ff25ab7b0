//! Round-constant tables.

use super::grain::Grain;
use super::params::ConstantsSource;
use super::permute::RoundKind;
use crate::error::{ErrorCode, Poseidon2Result};
use crate::field::FieldElement;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// Domain prefix for seeded constant expansion.
const SEED_DOMAIN: &[u8] = b"poseidon2-rc";

/// One row of `T` constants per round, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundConstants<F, const T: usize> {
    rows: Vec<[F; T]>,
}

impl<F: FieldElement, const T: usize> RoundConstants<F, T> {
    /// Build the table a [`ConstantsSource`] describes.
    pub fn from_source(
        source: &ConstantsSource<F>,
        full_rounds: usize,
        partial_rounds: usize,
    ) -> Poseidon2Result<Self> {
        match source {
            ConstantsSource::Grain => Ok(Self::grain(full_rounds, partial_rounds)),
            ConstantsSource::Seeded(seed) => Ok(Self::seeded(seed, full_rounds + partial_rounds)),
            ConstantsSource::Literal(rows) => Self::from_rows(rows, full_rounds + partial_rounds),
        }
    }

    /// Constants from the Grain LFSR.
    ///
    /// Full rounds draw `T` elements. Partial rounds draw one element for
    /// lane 0 and leave the other lanes zero.
    pub fn grain(full_rounds: usize, partial_rounds: usize) -> Self {
        let mut grain = Grain::new(F::NUM_BITS, T, full_rounds, partial_rounds);
        let rows = (0..full_rounds + partial_rounds)
            .map(|round| {
                let mut row = [F::ZERO; T];
                match RoundKind::of(round, full_rounds, partial_rounds) {
                    RoundKind::Full => row.iter_mut().for_each(|c| *c = grain.next_element()),
                    RoundKind::Partial => row[0] = grain.next_element(),
                }
                row
            })
            .collect();
        Self { rows }
    }

    /// Constants expanded from a seed.
    ///
    /// Entry `(r, i)` is the 512-bit big-endian integer
    /// `SHA256(prefix || 0x00) || SHA256(prefix || 0x01)` reduced mod `p`,
    /// where `prefix = "poseidon2-rc" || seed || r:u32be || i:u32be`.
    pub fn seeded(seed: &[u8], rounds: usize) -> Self {
        let rows = (0..rounds)
            .map(|round| {
                let mut row = [F::ZERO; T];
                for (lane, c) in row.iter_mut().enumerate() {
                    *c = seeded_element(seed, round as u32, lane as u32);
                }
                row
            })
            .collect();
        Self { rows }
    }

    /// Adopt a supplied table, checking its shape.
    pub fn from_rows(rows: &[Vec<F>], rounds: usize) -> Poseidon2Result<Self> {
        if rows.len() != rounds {
            return Err(ErrorCode::E107_RoundConstantsLength(
                rounds as u64,
                rows.len() as u64,
            ));
        }
        let rows = rows
            .iter()
            .enumerate()
            .map(|(round, row)| {
                <[F; T]>::try_from(row.as_slice()).map_err(|_| {
                    ErrorCode::E108_RoundConstantsWidth(round as u64, row.len() as u64)
                })
            })
            .collect::<Poseidon2Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    /// All rows in round order.
    pub fn rows(&self) -> &[[F; T]] {
        &self.rows
    }

    /// Constants for one round.
    pub fn round(&self, index: usize) -> Option<&[F; T]> {
        self.rows.get(index)
    }

    /// Number of rounds covered.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// SHA-256 over the canonical little-endian encoding of every entry, row-major.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for c in self.rows.iter().flatten() {
            hasher.update(c.to_canonical_le());
        }
        hasher.finalize().into()
    }
}

fn seeded_element<F: FieldElement>(seed: &[u8], round: u32, lane: u32) -> F {
    let mut wide = Vec::with_capacity(64);
    for block in [0u8, 1u8] {
        let mut hasher = Sha256::new();
        hasher.update(SEED_DOMAIN);
        hasher.update(seed);
        hasher.update(round.to_be_bytes());
        hasher.update(lane.to_be_bytes());
        hasher.update([block]);
        wide.extend_from_slice(&hasher.finalize());
    }
    F::from_biguint(&BigUint::from_bytes_be(&wide))
}
