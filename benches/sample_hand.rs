use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;
use uniqhands::hand::sample_hand_into;
use uniqhands::rng_from_seed;

fn do_sample_hand<R: Rng>(deck: u32, hand: u32, rng: &mut R, buf: &mut Vec<u32>) {
    sample_hand_into(deck, hand, rng, buf);
}

fn from_elem(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_hand");
    let mut rng = SmallRng::from_rng(&mut rng_from_seed(Some("test")));
    let mut buf = Vec::with_capacity(52);
    for hand in (1..=13).rev() {
        group.bench_with_input(BenchmarkId::from_parameter(format!("deck=52,hand={}", hand)), &hand, |b, &hand| {
            b.iter(|| do_sample_hand(52, hand, &mut rng, &mut buf));
        });
    }
    group.finish();
}

criterion_group!(benches, from_elem);
criterion_main!(benches);
