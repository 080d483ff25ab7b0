use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use poseidon2_sponge::{instances, Bls12Fr, Bn254Fr};
use std::hint::black_box;

pub fn bench_permutation(c: &mut Criterion) {
    let minimal = instances::bn254_minimal().unwrap();
    let reference = instances::bn254_reference().unwrap();
    let bls = instances::bls12_minimal().unwrap();

    let mut state: [Bn254Fr; 3] = std::array::from_fn(|i| Bn254Fr::from(i as u64 + 1));
    c.bench_function("permute bn254 minimal", |b| {
        b.iter(|| {
            minimal.permutation().permute_in_place(&mut state);
        })
    });
    c.bench_function("permute bn254 reference", |b| {
        b.iter(|| {
            reference.permutation().permute_in_place(&mut state);
        })
    });

    let mut state: [Bls12Fr; 3] = std::array::from_fn(|i| Bls12Fr::from(i as u64 + 1));
    c.bench_function("permute bls12_381 minimal", |b| {
        b.iter(|| {
            bls.permutation().permute_in_place(&mut state);
        })
    });
}

pub fn bench_hash(c: &mut Criterion) {
    let reference = instances::bn254_reference().unwrap();
    let mut group = c.benchmark_group("hash bn254 reference");
    for len in [1usize, 2, 8, 32] {
        let input: Vec<Bn254Fr> = (0..len as u64).map(Bn254Fr::from).collect();
        group.bench_with_input(BenchmarkId::from_parameter(len), &input, |b, input| {
            b.iter(|| reference.hash(black_box(input)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_permutation, bench_hash);
criterion_main!(benches);
