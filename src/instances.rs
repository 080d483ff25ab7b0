//! Process-wide instances of the shipped presets.
//!
//! Each instance is derived on first use, exactly once, and then shared by
//! reference for the life of the process. A construction error is cached
//! the same way, so it is reported on every call rather than retried.

use crate::error::Poseidon2Result;
use crate::field::{Bls12Fr, Bn254Fr, FieldElement, BLS12_381_MODULUS_DECIMAL};
use crate::poseidon::{Poseidon2, Poseidon2Params};
use std::sync::OnceLock;

/// Partial rounds of the published BN254 width-3 instance.
pub const BN254_REFERENCE_PARTIAL_ROUNDS: usize = 56;

/// Partial rounds of the published BLS12-381 width-3 instance.
pub const BLS12_381_REFERENCE_PARTIAL_ROUNDS: usize = 57;

/// Width-3 partial round count of the reference preset over `F`.
///
/// BLS12-381 gets its own count; every other field uses the BN254 one.
pub fn reference_partial_rounds<F: FieldElement>() -> usize {
    if F::modulus().to_str_radix(10) == BLS12_381_MODULUS_DECIMAL {
        BLS12_381_REFERENCE_PARTIAL_ROUNDS
    } else {
        BN254_REFERENCE_PARTIAL_ROUNDS
    }
}

/// Minimal preset over BN254.
pub fn bn254_minimal() -> Poseidon2Result<&'static Poseidon2<Bn254Fr, 3>> {
    static INSTANCE: OnceLock<Poseidon2Result<Poseidon2<Bn254Fr, 3>>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| Poseidon2::new(&Poseidon2Params::minimal()))
        .as_ref()
        .map_err(Clone::clone)
}

/// Reference preset over BN254, width 3.
pub fn bn254_reference() -> Poseidon2Result<&'static Poseidon2<Bn254Fr, 3>> {
    static INSTANCE: OnceLock<Poseidon2Result<Poseidon2<Bn254Fr, 3>>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| {
            Poseidon2::new(&Poseidon2Params::reference(3, BN254_REFERENCE_PARTIAL_ROUNDS))
        })
        .as_ref()
        .map_err(Clone::clone)
}

/// Minimal preset over BLS12-381.
pub fn bls12_minimal() -> Poseidon2Result<&'static Poseidon2<Bls12Fr, 3>> {
    static INSTANCE: OnceLock<Poseidon2Result<Poseidon2<Bls12Fr, 3>>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| Poseidon2::new(&Poseidon2Params::minimal()))
        .as_ref()
        .map_err(Clone::clone)
}

/// Reference preset over BLS12-381, width 3.
pub fn bls12_reference() -> Poseidon2Result<&'static Poseidon2<Bls12Fr, 3>> {
    static INSTANCE: OnceLock<Poseidon2Result<Poseidon2<Bls12Fr, 3>>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| {
            Poseidon2::new(&Poseidon2Params::reference(
                3,
                BLS12_381_REFERENCE_PARTIAL_ROUNDS,
            ))
        })
        .as_ref()
        .map_err(Clone::clone)
}
