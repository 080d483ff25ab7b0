//! Poseidon2 permutation.
//!
//! Round schedule, after an optional initial external mix:
//! - `R_f / 2` full rounds (S-box on every lane, external mix)
//! - `R_p` partial rounds (S-box on lane 0 only, internal mix)
//! - `R_f / 2` full rounds
//!
//! With `R_p = 0` all rounds are full and consecutive. Each round is
//! constant addition, S-box, then mixing; the output of the last round is
//! the permutation output. The number of rounds and the operation sequence
//! never depend on the state.

use super::constants::RoundConstants;
use super::linear::{ExternalLayer, InternalLayer, LinearLayer};
use super::params::Poseidon2Params;
use crate::error::{ErrorCode, Poseidon2Result};
use crate::field::FieldElement;
use log::debug;

/// Which layers a round uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundKind {
    /// S-box on every lane, external mix.
    Full,
    /// S-box on lane 0, internal mix.
    Partial,
}

impl RoundKind {
    /// Kind of round `round` in an `R_f`/`R_p` schedule.
    pub fn of(round: usize, full_rounds: usize, partial_rounds: usize) -> Self {
        let first_partial = full_rounds / 2;
        if (first_partial..first_partial + partial_rounds).contains(&round) {
            RoundKind::Partial
        } else {
            RoundKind::Full
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundKind::Full => "full",
            RoundKind::Partial => "partial",
        }
    }
}

/// State snapshots of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrace<F, const T: usize> {
    /// Zero-based round index.
    pub index: usize,
    /// Full or partial.
    pub kind: RoundKind,
    /// After adding the round constants.
    pub after_constants: [F; T],
    /// After the S-box layer.
    pub after_sbox: [F; T],
    /// After mixing; the input of the next round.
    pub output: [F; T],
}

/// A configured permutation of `[F; T]`.
///
/// Immutable after construction and freely shared between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation<F, const T: usize> {
    full_rounds: usize,
    partial_rounds: usize,
    sbox: u64,
    initial_linear_layer: bool,
    constants: RoundConstants<F, T>,
    linear: LinearLayer<F, T>,
}

impl<F: FieldElement, const T: usize> Permutation<F, T> {
    /// Build and validate from a parameter set.
    ///
    /// Every configuration error surfaces here; a constructed permutation
    /// cannot fail.
    pub fn new(params: &Poseidon2Params<F>) -> Poseidon2Result<Self> {
        params.validate_permutation()?;
        if params.width != T {
            return Err(ErrorCode::E111_WidthMismatch(params.width as u64, T as u64));
        }

        let constants = RoundConstants::from_source(
            &params.round_constants,
            params.full_rounds,
            params.partial_rounds,
        )?;
        let external = ExternalLayer::from_source(&params.external_matrix)?;
        let internal = if params.partial_rounds > 0 {
            Some(InternalLayer::from_source(&params.internal_diagonal)?)
        } else {
            None
        };

        debug!(
            "permutation ready: t={} R_f={} R_p={} alpha={} initial_mix={} constants={}",
            T,
            params.full_rounds,
            params.partial_rounds,
            params.sbox,
            params.initial_linear_layer,
            hex::encode(constants.fingerprint())
        );

        Ok(Self {
            full_rounds: params.full_rounds,
            partial_rounds: params.partial_rounds,
            sbox: params.sbox,
            initial_linear_layer: params.initial_linear_layer,
            constants,
            linear: LinearLayer::new(external, internal),
        })
    }

    /// `R_f`.
    pub fn full_rounds(&self) -> usize {
        self.full_rounds
    }

    /// `R_p`.
    pub fn partial_rounds(&self) -> usize {
        self.partial_rounds
    }

    /// Rounds executed per call, `R_f + R_p`.
    pub fn rounds(&self) -> usize {
        self.constants.len()
    }

    /// S-box exponent.
    pub fn sbox_exponent(&self) -> u64 {
        self.sbox
    }

    /// Whether the external layer runs once before round 0.
    pub fn has_initial_linear_layer(&self) -> bool {
        self.initial_linear_layer
    }

    /// The round-constant table.
    pub fn constants(&self) -> &RoundConstants<F, T> {
        &self.constants
    }

    /// The linear layers.
    pub fn linear(&self) -> &LinearLayer<F, T> {
        &self.linear
    }

    /// Apply the permutation.
    pub fn permute(&self, state: &[F; T]) -> [F; T] {
        self.run(state, |_, _, _, _, _| {})
    }

    /// Apply the permutation in place.
    pub fn permute_in_place(&self, state: &mut [F; T]) {
        *state = self.permute(state);
    }

    /// Apply the permutation, recording every round.
    ///
    /// The trace has exactly [`rounds`](Self::rounds) entries for every input.
    pub fn permute_with_trace(&self, state: &[F; T]) -> ([F; T], Vec<RoundTrace<F, T>>) {
        let mut traces = Vec::with_capacity(self.rounds());
        let output = self.run(state, |index, kind, after_constants, after_sbox, output| {
            traces.push(RoundTrace {
                index,
                kind,
                after_constants: *after_constants,
                after_sbox: *after_sbox,
                output: *output,
            });
        });
        (output, traces)
    }

    fn run<O>(&self, state: &[F; T], mut observe: O) -> [F; T]
    where
        O: FnMut(usize, RoundKind, &[F; T], &[F; T], &[F; T]),
    {
        let mut st = *state;
        if self.initial_linear_layer {
            st = self.linear.external_mix(&st);
        }

        for (index, constants) in self.constants.rows().iter().enumerate() {
            let kind = RoundKind::of(index, self.full_rounds, self.partial_rounds);

            let mut after_constants = st;
            for (x, c) in after_constants.iter_mut().zip(constants.iter()) {
                *x += c;
            }

            let mut after_sbox = after_constants;
            match kind {
                RoundKind::Full => {
                    for x in after_sbox.iter_mut() {
                        *x = self.sbox(*x);
                    }
                }
                RoundKind::Partial => {
                    if let Some(first) = after_sbox.first_mut() {
                        *first = self.sbox(*first);
                    }
                }
            }

            st = match kind {
                RoundKind::Full => self.linear.external_mix(&after_sbox),
                RoundKind::Partial => self.linear.internal_mix(&after_sbox),
            };
            observe(index, kind, &after_constants, &after_sbox, &st);
        }

        st
    }

    #[inline]
    fn sbox(&self, x: F) -> F {
        if self.sbox == 5 {
            x.square().square() * x
        } else {
            x.power(self.sbox)
        }
    }
}
