//! Sponge construction over the Poseidon2 permutation.
//!
//! Lanes `[0, rate)` carry input and output; lanes `[rate, T)` are capacity.
//! A fresh sponge is all zeros except the domain tag in lane `rate`.

use super::params::{Padding, Poseidon2Params};
use super::permute::Permutation;
use crate::error::{ErrorCode, Poseidon2Result};
use crate::field::FieldElement;
use log::debug;

/// Sponge operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Absorbing input elements
    Absorbing,
    /// Squeezing output elements
    Squeezing,
}

/// Rate, capacity, domain tag and padding of a sponge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpongeConfig<F> {
    width: usize,
    rate: usize,
    capacity: usize,
    domain_tag: F,
    padding: Padding,
}

impl<F: FieldElement> SpongeConfig<F> {
    /// Validate and build for a state of `width` lanes.
    pub fn new(
        width: usize,
        rate: usize,
        capacity: usize,
        domain_tag: F,
        padding: Padding,
    ) -> Poseidon2Result<Self> {
        if width == 0 {
            return Err(ErrorCode::E100_ZeroWidth);
        }
        if rate == 0 {
            return Err(ErrorCode::E101_ZeroRate);
        }
        if capacity == 0 {
            return Err(ErrorCode::E102_ZeroCapacity);
        }
        if rate + capacity != width {
            return Err(ErrorCode::E103_RateCapacityMismatch(
                rate as u64,
                capacity as u64,
                width as u64,
            ));
        }
        if padding == Padding::ZeroFill && rate != 1 {
            return Err(ErrorCode::E113_AmbiguousPadding(rate as u64));
        }
        Ok(Self {
            width,
            rate,
            capacity,
            domain_tag,
            padding,
        })
    }

    /// Sponge part of a parameter set.
    pub fn from_params(params: &Poseidon2Params<F>) -> Poseidon2Result<Self> {
        Self::new(
            params.width,
            params.rate,
            params.capacity,
            params.domain_tag,
            params.padding,
        )
    }

    /// State width the configuration was validated against.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Lanes absorbed or squeezed per permutation call.
    pub fn rate(&self) -> usize {
        self.rate
    }

    /// Hidden lanes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Initial value of lane `rate`.
    pub fn domain_tag(&self) -> F {
        self.domain_tag
    }

    /// Final-block rule.
    pub fn padding(&self) -> Padding {
        self.padding
    }
}

/// Incremental absorb/squeeze over a borrowed permutation.
///
/// Each sponge owns its state; the permutation and configuration are
/// shared read-only.
#[derive(Debug, Clone)]
pub struct Sponge<'a, F, const T: usize> {
    permutation: &'a Permutation<F, T>,
    config: &'a SpongeConfig<F>,
    state: [F; T],
    pos: usize,
    mode: Mode,
    absorbed: usize,
}

impl<'a, F: FieldElement, const T: usize> Sponge<'a, F, T> {
    /// Fresh sponge: zero state with the domain tag in lane `rate`.
    ///
    /// Fails with `E111` if `config` was built for a width other than `T`.
    pub fn new(
        permutation: &'a Permutation<F, T>,
        config: &'a SpongeConfig<F>,
    ) -> Poseidon2Result<Self> {
        if config.width != T {
            return Err(ErrorCode::E111_WidthMismatch(config.width as u64, T as u64));
        }
        Ok(Self::fresh(permutation, config))
    }

    fn fresh(permutation: &'a Permutation<F, T>, config: &'a SpongeConfig<F>) -> Self {
        let mut state = [F::ZERO; T];
        state[config.rate] = config.domain_tag;
        Self {
            permutation,
            config,
            state,
            pos: 0,
            mode: Mode::Absorbing,
            absorbed: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> &[F; T] {
        &self.state
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Absorb one element.
    ///
    /// 1. if squeezing: permute, switch to absorbing, pos = 0
    /// 2. state[pos] += x; pos += 1
    /// 3. if pos == rate: permute, pos = 0
    pub fn absorb_one(&mut self, x: F) {
        if self.mode == Mode::Squeezing {
            self.permute();
            self.mode = Mode::Absorbing;
            self.pos = 0;
        }

        self.state[self.pos] += x;
        self.pos += 1;
        self.absorbed += 1;

        if self.pos >= self.config.rate {
            self.permute();
            self.pos = 0;
        }
    }

    /// Absorb a sequence of elements.
    pub fn absorb(&mut self, elements: &[F]) {
        for &x in elements {
            self.absorb_one(x);
        }
    }

    /// Close the input per the padding rule and switch to squeezing.
    fn finalize(&mut self) -> Poseidon2Result<()> {
        if self.mode == Mode::Squeezing {
            return Ok(());
        }
        match self.config.padding {
            Padding::ZeroFill => {
                if self.absorbed == 0 {
                    return Err(ErrorCode::E200_EmptyPreimage);
                }
                if self.pos > 0 {
                    self.permute();
                }
            }
            Padding::Pad10 => {
                self.state[self.pos] += F::ONE;
                self.permute();
            }
        }
        self.mode = Mode::Squeezing;
        self.pos = 0;
        Ok(())
    }

    /// Squeeze one element.
    ///
    /// 1. if absorbing: finalize, pos = 0
    /// 2. if pos == rate: permute, pos = 0
    /// 3. y = state[pos]; pos += 1
    pub fn squeeze_one(&mut self) -> Poseidon2Result<F> {
        self.finalize()?;

        if self.pos >= self.config.rate {
            self.permute();
            self.pos = 0;
        }

        let y = self.state[self.pos];
        self.pos += 1;
        Ok(y)
    }

    /// Squeeze `n` elements.
    pub fn squeeze(&mut self, n: usize) -> Poseidon2Result<Vec<F>> {
        if n == 0 {
            return Err(ErrorCode::E114_ZeroOutputLength);
        }
        (0..n).map(|_| self.squeeze_one()).collect()
    }

    fn permute(&mut self) {
        self.permutation.permute_in_place(&mut self.state);
    }
}

/// A permutation bundled with its sponge configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poseidon2<F, const T: usize> {
    permutation: Permutation<F, T>,
    config: SpongeConfig<F>,
}

impl<F: FieldElement, const T: usize> Poseidon2<F, T> {
    /// Validate `params` and derive constants and layers.
    pub fn new(params: &Poseidon2Params<F>) -> Poseidon2Result<Self> {
        params.validate()?;
        let permutation = Permutation::new(params)?;
        let config = SpongeConfig::from_params(params)?;
        debug!(
            "sponge ready: t={} rate={} capacity={} padding={:?}",
            T, config.rate, config.capacity, config.padding
        );
        Ok(Self {
            permutation,
            config,
        })
    }

    /// The permutation.
    pub fn permutation(&self) -> &Permutation<F, T> {
        &self.permutation
    }

    /// The sponge configuration.
    pub fn config(&self) -> &SpongeConfig<F> {
        &self.config
    }

    /// A fresh sponge.
    pub fn sponge(&self) -> Sponge<'_, F, T> {
        // Width already checked against T in `new`.
        Sponge::fresh(&self.permutation, &self.config)
    }

    /// Apply the bare permutation.
    pub fn permute(&self, state: &[F; T]) -> [F; T] {
        self.permutation.permute(state)
    }

    /// Hash a preimage to one element.
    pub fn hash(&self, elements: &[F]) -> Poseidon2Result<F> {
        let mut sponge = self.sponge();
        sponge.absorb(elements);
        sponge.squeeze_one()
    }

    /// Hash a preimage to `n` elements.
    pub fn hash_n(&self, elements: &[F], n: usize) -> Poseidon2Result<Vec<F>> {
        let mut sponge = self.sponge();
        sponge.absorb(elements);
        sponge.squeeze(n)
    }
}
