//! Poseidon2 permutation and sponge hash over prime fields.
//!
//! The core is generic over the field (`ff::PrimeField`) and the state width
//! (a const generic), so the modulus, width and round counts are parameters
//! rather than constants. Two presets are shipped: the eight-round
//! all-external configuration used by the circuit front end, and the
//! two-phase Poseidon2 schedule with published constants.
//!
//! # Architecture
//!
//! - [`field`] - prime field arithmetic and canonical encodings
//! - [`poseidon`] - round constants, linear layers, permutation, sponge
//! - [`instances`] - process-wide cached preset instances
//! - [`config`] - JSON parameter files and width/field dispatch
//! - [`conformance`] - known-answer vector files and their runner
//! - [`error`] - error codes
//!
//! # Example
//!
//! ```
//! use poseidon2_sponge::{instances, Bn254Fr};
//!
//! let hasher = instances::bn254_minimal()?;
//! let digest = hasher.hash(&[Bn254Fr::from(1u64)])?;
//! let state = [Bn254Fr::from(1u64), Bn254Fr::from(0u64), Bn254Fr::from(0u64)];
//! assert_eq!(digest, hasher.permute(&state)[0]);
//! # Ok::<(), poseidon2_sponge::ErrorCode>(())
//! ```

// Hashing must not abort the caller: no unwrap/expect/panic in library code.
// Tests are checked separately with `cargo test`.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod config;
pub mod conformance;
pub mod error;
pub mod field;
pub mod instances;
pub mod poseidon;

// Re-export commonly used types
pub use config::{FieldName, InstanceVisitor, ParamFile, Preset};
pub use error::{ErrorCode, Poseidon2Result};
pub use field::{Bls12Fr, Bn254Fr, FieldElement};
pub use poseidon::{Padding, Permutation, Poseidon2, Poseidon2Params, RoundKind, RoundTrace, Sponge};
