//! Grain LFSR round-constant generator.
//!
//! This is the generator of the Poseidon reference parameter scripts, which
//! Poseidon2 reuses. The 80-bit register is seeded with the instance
//! description, clocked 160 times, and then read through a self-shrinking
//! filter. Field elements are `n`-bit big-endian candidates with rejection
//! sampling against the modulus.

use crate::field::FieldElement;
use num_bigint::BigUint;

const REGISTER_BITS: usize = 80;
const WARM_UP_CLOCKS: usize = 160;

/// Field type tag for prime fields.
const FIELD_PRIME: u64 = 1;
/// S-box type tag for `x^alpha`.
const SBOX_POWER: u64 = 0;

pub(crate) struct Grain {
    bits: [bool; REGISTER_BITS],
    head: usize,
}

impl Grain {
    /// Seed the register for an instance and run the warm-up clocks.
    pub(crate) fn new(
        field_bits: u32,
        width: usize,
        full_rounds: usize,
        partial_rounds: usize,
    ) -> Self {
        let fields: [(u64, usize); 6] = [
            (FIELD_PRIME, 2),
            (SBOX_POWER, 4),
            (field_bits as u64, 12),
            (width as u64, 12),
            (full_rounds as u64, 10),
            (partial_rounds as u64, 10),
        ];

        let mut bits = [true; REGISTER_BITS];
        let mut at = 0;
        for (value, len) in fields {
            for shift in (0..len).rev() {
                bits[at] = (value >> shift) & 1 == 1;
                at += 1;
            }
        }
        // The remaining 30 bits stay set.

        let mut grain = Self { bits, head: 0 };
        for _ in 0..WARM_UP_CLOCKS {
            grain.clock();
        }
        grain
    }

    fn tap(&self, offset: usize) -> bool {
        self.bits[(self.head + offset) % REGISTER_BITS]
    }

    /// Shift in `b62 ^ b51 ^ b38 ^ b23 ^ b13 ^ b0` and return it.
    fn clock(&mut self) -> bool {
        let bit = self.tap(62)
            ^ self.tap(51)
            ^ self.tap(38)
            ^ self.tap(23)
            ^ self.tap(13)
            ^ self.tap(0);
        self.bits[self.head] = bit;
        self.head = (self.head + 1) % REGISTER_BITS;
        bit
    }

    /// Self-shrinking output: clock pairs, keep the second bit when the first is set.
    fn next_bit(&mut self) -> bool {
        loop {
            let keep = self.clock();
            let bit = self.clock();
            if keep {
                return bit;
            }
        }
    }

    /// Next uniformly distributed field element.
    pub(crate) fn next_element<F: FieldElement>(&mut self) -> F {
        let modulus = F::modulus();
        loop {
            let mut candidate = BigUint::from(0u32);
            for _ in 0..F::NUM_BITS {
                candidate <<= 1;
                if self.next_bit() {
                    candidate += 1u32;
                }
            }
            if candidate < modulus {
                return F::from_biguint(&candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Bn254Fr;

    #[test]
    fn test_deterministic() {
        let mut a = Grain::new(254, 3, 8, 56);
        let mut b = Grain::new(254, 3, 8, 56);
        for _ in 0..4 {
            assert_eq!(a.next_element::<Bn254Fr>(), b.next_element::<Bn254Fr>());
        }
    }

    #[test]
    fn test_first_bn254_constant() {
        let mut grain = Grain::new(254, 3, 8, 56);
        let first: Bn254Fr = grain.next_element();
        assert_eq!(
            first.to_hex_be(),
            "0x1d066a255517b7fd8bddd3a93f7804ef7f8fcde48bb4c37a59a09a1a97052816"
        );
    }

    #[test]
    fn test_instance_description_changes_stream() {
        let mut a = Grain::new(254, 3, 8, 56);
        let mut b = Grain::new(254, 3, 8, 57);
        assert_ne!(a.next_element::<Bn254Fr>(), b.next_element::<Bn254Fr>());
    }
}
