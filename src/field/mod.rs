//! Prime field arithmetic.
//!
//! The permutation and sponge are generic over any `ff::PrimeField`; this
//! module adds the [`FieldElement`] extension trait and names the two scalar
//! fields shipped with presets.
//!
//! # Guarantees
//!
//! - Every observable value is the canonical residue in `[0, p)`
//! - Integers of any size are reduced on construction, never rejected
//! - Byte decoders are strict: one accepted encoding per element

mod element;

pub use element::{parse_integer, FieldElement};

/// BN254 scalar field, the native field of most circuit front ends.
pub type Bn254Fr = halo2curves::bn256::Fr;

/// BLS12-381 scalar field.
pub type Bls12Fr = bls12_381::Scalar;

/// BN254 scalar field modulus in decimal.
pub const BN254_MODULUS_DECIMAL: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// BLS12-381 scalar field modulus in decimal.
pub const BLS12_381_MODULUS_DECIMAL: &str =
    "52435875175126190479447740508185965837690552500527637822603658699938581184513";
