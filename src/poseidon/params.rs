//! Parameter sets for the permutation and sponge.
//!
//! A [`Poseidon2Params`] is the whole configuration surface: dimensions,
//! round counts, S-box exponent, padding, domain tag and where the round
//! constants and linear layers come from. It is plain data; nothing is
//! derived until a [`Permutation`](super::Permutation) or
//! [`Poseidon2`](super::Poseidon2) is built from it, and every check in
//! [`validate`](Poseidon2Params::validate) runs at that point.

use super::sponge::SpongeConfig;
use crate::error::{ErrorCode, Poseidon2Result};
use crate::field::FieldElement;
use serde::{Deserialize, Serialize};

/// Full rounds used by both shipped presets.
pub const DEFAULT_FULL_ROUNDS: usize = 8;

/// S-box exponent used by both shipped presets.
pub const DEFAULT_SBOX: u64 = 5;

/// How the final (possibly partial) block is closed before squeezing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Permute the pending block as-is, leaving unused rate lanes untouched.
    ///
    /// Only unambiguous when `rate == 1`; other rates are rejected.
    ZeroFill,
    /// Add a single `1` after the last element, then permute.
    Pad10,
}

/// Source of the round-constant table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantsSource<F> {
    /// Grain LFSR of the Poseidon reference parameter generator.
    Grain,
    /// SHA-256 expansion of a domain-separation seed.
    Seeded(Vec<u8>),
    /// Supplied table, one row of `width` elements per round.
    Literal(Vec<Vec<F>>),
}

/// Source of the dense external matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixSource<F> {
    /// Generated Poseidon2 external matrix for the width.
    Poseidon2,
    /// Supplied `width x width` matrix.
    Literal(Vec<Vec<F>>),
}

/// Source of the internal-layer diagonal `d` in `J + diag(d)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagonalSource<F> {
    /// Published Poseidon2 diagonal for the width.
    Poseidon2,
    /// Supplied diagonal of `width` elements.
    Literal(Vec<F>),
}

/// Complete configuration of a permutation plus sponge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poseidon2Params<F> {
    /// State width `t`.
    pub width: usize,
    /// Lanes exposed to absorb/squeeze.
    pub rate: usize,
    /// Hidden lanes.
    pub capacity: usize,
    /// External (full) rounds `R_f`, split evenly around the partial rounds.
    pub full_rounds: usize,
    /// Internal (partial) rounds `R_p`.
    pub partial_rounds: usize,
    /// S-box exponent.
    pub sbox: u64,
    /// Apply the external layer once before round 0.
    pub initial_linear_layer: bool,
    /// Value placed in the first capacity lane of a fresh sponge.
    pub domain_tag: F,
    /// Final-block rule.
    pub padding: Padding,
    /// Round constants.
    pub round_constants: ConstantsSource<F>,
    /// External matrix.
    pub external_matrix: MatrixSource<F>,
    /// Internal diagonal, consulted only when `partial_rounds > 0`.
    pub internal_diagonal: DiagonalSource<F>,
}

impl<F: FieldElement> Poseidon2Params<F> {
    /// The traced circuit configuration.
    ///
    /// `t = 3`, rate 1, eight external rounds and no internal rounds, no
    /// initial linear layer, constants `c[r][i] = 3r + i + 1`, external
    /// matrix `[[2,1,1],[1,2,1],[1,1,3]]`, zero-fill padding, domain tag 0.
    /// Hashing `[x]` is therefore `permute([x, 0, 0])[0]`.
    pub fn minimal() -> Self {
        let width = 3;
        let constants: Vec<Vec<F>> = (0..DEFAULT_FULL_ROUNDS as u64)
            .map(|round| {
                (0..width as u64)
                    .map(|lane| F::from(width as u64 * round + lane + 1))
                    .collect::<Vec<F>>()
            })
            .collect();
        let matrix: Vec<Vec<F>> = [[2u64, 1, 1], [1, 2, 1], [1, 1, 3]]
            .iter()
            .map(|row| row.iter().map(|&v| F::from(v)).collect::<Vec<F>>())
            .collect();

        Self {
            width,
            rate: 1,
            capacity: 2,
            full_rounds: DEFAULT_FULL_ROUNDS,
            partial_rounds: 0,
            sbox: DEFAULT_SBOX,
            initial_linear_layer: false,
            domain_tag: F::ZERO,
            padding: Padding::ZeroFill,
            round_constants: ConstantsSource::Literal(constants),
            external_matrix: MatrixSource::Literal(matrix),
            internal_diagonal: DiagonalSource::Poseidon2,
        }
    }

    /// The two-phase Poseidon2 schedule with published constants.
    ///
    /// Initial external layer, `R_f = 8` around `partial_rounds` internal
    /// rounds, Grain constants, generated matrices, capacity 1 and
    /// `Pad10`. The generated internal diagonal exists for widths 2 and 3;
    /// other widths need a literal diagonal.
    pub fn reference(width: usize, partial_rounds: usize) -> Self {
        Self {
            width,
            rate: width.saturating_sub(1),
            capacity: 1,
            full_rounds: DEFAULT_FULL_ROUNDS,
            partial_rounds,
            sbox: DEFAULT_SBOX,
            initial_linear_layer: true,
            domain_tag: F::ZERO,
            padding: Padding::Pad10,
            round_constants: ConstantsSource::Grain,
            external_matrix: MatrixSource::Poseidon2,
            internal_diagonal: DiagonalSource::Poseidon2,
        }
    }

    /// `R_f + R_p`.
    pub fn total_rounds(&self) -> usize {
        self.full_rounds + self.partial_rounds
    }

    /// Every check, permutation and sponge.
    pub fn validate(&self) -> Poseidon2Result<()> {
        self.validate_permutation()?;
        self.validate_sponge()
    }

    /// Width, round schedule and S-box.
    ///
    /// Table and matrix dimensions are checked when those are built.
    pub fn validate_permutation(&self) -> Poseidon2Result<()> {
        if self.width == 0 {
            return Err(ErrorCode::E100_ZeroWidth);
        }
        if self.total_rounds() == 0 {
            return Err(ErrorCode::E105_NoRounds);
        }
        if self.partial_rounds > 0 && self.full_rounds % 2 == 1 {
            return Err(ErrorCode::E104_OddFullRounds(self.full_rounds as u64));
        }
        if !sbox_is_permutation::<F>(self.sbox) {
            return Err(ErrorCode::E106_InvalidSboxExponent(self.sbox));
        }
        Ok(())
    }

    /// Rate, capacity and padding.
    pub fn validate_sponge(&self) -> Poseidon2Result<()> {
        SpongeConfig::from_params(self).map(|_| ())
    }
}

/// `x -> x^alpha` is a bijection exactly when `gcd(alpha, p - 1) = 1`.
fn sbox_is_permutation<F: FieldElement>(alpha: u64) -> bool {
    if alpha < 3 {
        return false;
    }
    let order = F::modulus() - 1u32;
    let remainder = (order % alpha).to_u64_digits().first().copied().unwrap_or(0);
    gcd(alpha, remainder) == 1
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Bls12Fr, Bn254Fr};

    #[test]
    fn test_presets_validate() {
        assert!(Poseidon2Params::<Bn254Fr>::minimal().validate().is_ok());
        assert!(Poseidon2Params::<Bn254Fr>::reference(3, 56).validate().is_ok());
        assert!(Poseidon2Params::<Bls12Fr>::minimal().validate().is_ok());
    }

    #[test]
    fn test_minimal_constants_start_at_one() {
        let params = Poseidon2Params::<Bn254Fr>::minimal();
        let rows = match &params.round_constants {
            ConstantsSource::Literal(rows) => rows.clone(),
            _ => Vec::new(),
        };
        assert_eq!(rows.len(), 8);
        assert_eq!(
            rows[0],
            vec![Bn254Fr::from(1u64), Bn254Fr::from(2u64), Bn254Fr::from(3u64)]
        );
        assert_eq!(rows[7][2], Bn254Fr::from(24u64));
    }

    #[test]
    fn test_sponge_dimension_errors() {
        let mut params = Poseidon2Params::<Bn254Fr>::minimal();
        params.capacity = 0;
        params.rate = 3;
        assert_eq!(params.validate(), Err(ErrorCode::E102_ZeroCapacity));

        let mut params = Poseidon2Params::<Bn254Fr>::minimal();
        params.rate = 0;
        assert_eq!(params.validate(), Err(ErrorCode::E101_ZeroRate));

        let mut params = Poseidon2Params::<Bn254Fr>::minimal();
        params.rate = 2;
        assert_eq!(
            params.validate(),
            Err(ErrorCode::E103_RateCapacityMismatch(2, 2, 3))
        );

        let mut params = Poseidon2Params::<Bn254Fr>::minimal();
        params.width = 0;
        assert_eq!(params.validate(), Err(ErrorCode::E100_ZeroWidth));
    }

    #[test]
    fn test_zero_fill_needs_rate_one() {
        let mut params = Poseidon2Params::<Bn254Fr>::reference(3, 56);
        params.padding = Padding::ZeroFill;
        assert_eq!(params.validate(), Err(ErrorCode::E113_AmbiguousPadding(2)));
    }

    #[test]
    fn test_round_schedule_errors() {
        let mut params = Poseidon2Params::<Bn254Fr>::minimal();
        params.full_rounds = 0;
        assert_eq!(params.validate(), Err(ErrorCode::E105_NoRounds));

        let mut params = Poseidon2Params::<Bn254Fr>::reference(3, 56);
        params.full_rounds = 7;
        assert_eq!(params.validate(), Err(ErrorCode::E104_OddFullRounds(7)));

        // Odd full rounds are fine when every round is full.
        let mut params = Poseidon2Params::<Bn254Fr>::minimal();
        params.full_rounds = 7;
        assert!(params.validate_permutation().is_ok());
    }

    #[test]
    fn test_sbox_exponent() {
        // p - 1 is divisible by 3 for both fields, never by 5.
        assert!(sbox_is_permutation::<Bn254Fr>(5));
        assert!(!sbox_is_permutation::<Bn254Fr>(3));
        assert!(!sbox_is_permutation::<Bn254Fr>(2));
        assert!(sbox_is_permutation::<Bls12Fr>(5));
        assert!(!sbox_is_permutation::<Bls12Fr>(3));

        let mut params = Poseidon2Params::<Bn254Fr>::minimal();
        params.sbox = 3;
        assert_eq!(params.validate(), Err(ErrorCode::E106_InvalidSboxExponent(3)));
    }
}
