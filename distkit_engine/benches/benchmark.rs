use criterion::{criterion_group, criterion_main, Criterion};
use distkit_engine::{
    constructors::{random, Alphabet},
    grid::{simplex_grid, GridMode},
    mixture::{mix, mix_fast, MixSpace},
    JointDistribution,
};
use rand::{rngs::StdRng, SeedableRng};

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn criterion_benchmark(c: &mut Criterion) {
    let dists = random_inputs(DISTRIBUTIONS, OUTCOME_LENGTH);
    let weights = vec![1.0 / DISTRIBUTIONS as f64; DISTRIBUTIONS];

    c.bench_function("mix 16x4 bits", |b| {
        b.iter(|| mix(&dists, &weights, MixSpace::Shared).unwrap())
    });
    c.bench_function("mix_fast 16x4 bits", |b| {
        b.iter(|| mix_fast(&dists, &weights).unwrap())
    });

    c.bench_function("simplex grid 16 outcomes, 2^2", |b| {
        b.iter(|| {
            simplex_grid(dists[0].len(), 2, 2)
                .unwrap()
                .with_template(dists[0].clone(), GridMode::ReuseBuffer)
                .unwrap()
                .count()
        })
    });
}

fn random_inputs(count: usize, outcome_length: usize) -> Vec<JointDistribution> {
    let mut rng = StdRng::seed_from_u64(0);
    (0..count)
        .map(|_| random(outcome_length, Alphabet::Size(2), None, Some(&mut rng)).unwrap())
        .collect()
}

const DISTRIBUTIONS: usize = 16;
const OUTCOME_LENGTH: usize = 4;
