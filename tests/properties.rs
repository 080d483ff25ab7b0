//! Property tests over random preimages and states.

use ff::{Field, PrimeField};
use poseidon2_sponge::{instances, Bn254Fr, FieldElement};
use proptest::prelude::*;

fn element() -> impl Strategy<Value = Bn254Fr> {
    any::<[u64; 4]>().prop_map(|limbs| {
        limbs
            .iter()
            .fold(Bn254Fr::ZERO, |acc, &limb| {
                acc * Bn254Fr::from_u128(1u128 << 64) + Bn254Fr::from(limb)
            })
    })
}

fn preimage(max: usize) -> impl Strategy<Value = Vec<Bn254Fr>> {
    prop::collection::vec(element(), 1..=max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn hash_is_deterministic(input in preimage(6)) {
        let h = instances::bn254_reference().unwrap();
        prop_assert_eq!(h.hash(&input).unwrap(), h.hash(&input).unwrap());
    }

    #[test]
    fn hash_is_first_of_hash_n(input in preimage(6), n in 1usize..6) {
        let h = instances::bn254_reference().unwrap();
        let outputs = h.hash_n(&input, n).unwrap();
        prop_assert_eq!(outputs.len(), n);
        prop_assert_eq!(outputs[0], h.hash(&input).unwrap());
    }

    #[test]
    fn changing_one_element_changes_hash(
        input in preimage(5),
        index in any::<prop::sample::Index>(),
    ) {
        let h = instances::bn254_minimal().unwrap();
        let mut changed = input.clone();
        let i = index.index(changed.len());
        changed[i] += Bn254Fr::ONE;
        prop_assert_ne!(h.hash(&input).unwrap(), h.hash(&changed).unwrap());
    }

    #[test]
    fn pad10_appending_zero_changes_hash(input in preimage(5)) {
        let h = instances::bn254_reference().unwrap();
        let mut extended = input.clone();
        extended.push(Bn254Fr::ZERO);
        prop_assert_ne!(h.hash(&input).unwrap(), h.hash(&extended).unwrap());
    }

    #[test]
    fn trace_agrees_with_permute(state in any::<[u64; 3]>()) {
        let h = instances::bn254_reference().unwrap();
        let state = state.map(Bn254Fr::from);
        let (output, trace) = h.permutation().permute_with_trace(&state);
        prop_assert_eq!(output, h.permute(&state));
        prop_assert_eq!(trace.len(), h.permutation().rounds());
    }

    #[test]
    fn decimal_round_trip(x in element()) {
        prop_assert_eq!(Bn254Fr::from_integer_str(&x.to_decimal()).unwrap(), x);
        prop_assert_eq!(Bn254Fr::from_hex_be(&x.to_hex_be()).unwrap(), x);
    }
}
