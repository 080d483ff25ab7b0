//! Poseidon2 permutation and sponge.
//!
//! Generic over the prime field `F` and the state width `T`. Parameters are
//! validated and every derived table is built once, when a [`Permutation`]
//! or [`Poseidon2`] is constructed; hashing after that is total.
//!
//! # Layout
//!
//! - [`params`]: configuration surface and the shipped presets
//! - [`constants`]: round-constant tables (Grain, seeded, literal)
//! - [`linear`]: external and internal diffusion layers
//! - [`permute`]: the round schedule, with a tracing variant
//! - [`sponge`]: absorb/squeeze and one-shot hashing

pub mod constants;
mod grain;
pub mod linear;
pub mod params;
pub mod permute;
pub mod sponge;

pub use constants::RoundConstants;
pub use linear::{ExternalLayer, InternalLayer, LinearLayer, Matrix};
pub use params::{
    ConstantsSource, DiagonalSource, MatrixSource, Padding, Poseidon2Params, DEFAULT_FULL_ROUNDS,
    DEFAULT_SBOX,
};
pub use permute::{Permutation, RoundKind, RoundTrace};
pub use sponge::{Mode, Poseidon2, Sponge, SpongeConfig};
