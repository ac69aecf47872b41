use std::time::Duration;

use criterion::{
    criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, Criterion, SamplingMode,
};
use lazyac::Transition;
use rand::{rngs::StdRng, Rng, SeedableRng};

const SAMPLE_SIZE: usize = 10;
const WARM_UP_TIME: Duration = Duration::from_secs(5);
const MEASURE_TIME: Duration = Duration::from_secs(10);

const NUM_KEYS: usize = 10000;
const NUM_TEXTS: usize = 100;
const TEXT_LEN: usize = 1000;

fn criterion_random_exact(c: &mut Criterion) {
    let mut group = c.benchmark_group("random/exact");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);
    let keys = make_keys();

    add_exact_match_benches(&mut group, &keys, &keys[..1000]);
}

fn criterion_random_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("random/scan");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP_TIME);
    group.measurement_time(MEASURE_TIME);
    group.sampling_mode(SamplingMode::Flat);
    let keys = make_keys();
    let texts = make_texts();

    add_find_overlapping_benches(&mut group, &keys, &texts);
}

fn add_exact_match_benches(
    group: &mut BenchmarkGroup<WallTime>,
    keys: &[Vec<u8>],
    queries: &[Vec<u8>],
) {
    group.bench_function("lazyac/automaton", |b| {
        let pma = lazyac::Automaton::from_patterns(keys).unwrap();
        b.iter(|| {
            let mut dummy = 0usize;
            for query in queries {
                dummy += pma.exact_match(query).unwrap() as usize;
            }
            if dummy == 0 {
                panic!();
            }
        });
    });

    group.bench_function("lazyac/frozen", |b| {
        let pma = lazyac::FrozenAutomaton::from_patterns(keys).unwrap();
        b.iter(|| {
            let mut dummy = 0usize;
            for query in queries {
                dummy += pma.exact_match(query).unwrap() as usize;
            }
            if dummy == 0 {
                panic!();
            }
        });
    });
}

fn add_find_overlapping_benches(
    group: &mut BenchmarkGroup<WallTime>,
    keys: &[Vec<u8>],
    texts: &[Vec<u8>],
) {
    group.bench_function("lazyac/automaton/cold", |b| {
        b.iter(|| {
            let pma = lazyac::Automaton::from_patterns(keys).unwrap();
            let mut sum = 0;
            for text in texts {
                for m in pma.find_overlapping_iter(text) {
                    sum += m.end() + m.value() as usize;
                }
            }
            if sum == 0 {
                panic!();
            }
        });
    });

    group.bench_function("lazyac/frozen/cold", |b| {
        b.iter(|| {
            let pma = lazyac::FrozenAutomaton::from_patterns(keys).unwrap();
            let mut sum = 0;
            for text in texts {
                for m in pma.find_overlapping_iter(text) {
                    sum += m.end() + m.value() as usize;
                }
            }
            if sum == 0 {
                panic!();
            }
        });
    });

    group.bench_function("lazyac/automaton", |b| {
        let pma = lazyac::Automaton::from_patterns(keys).unwrap();
        b.iter(|| {
            let mut sum = 0;
            for text in texts {
                for m in pma.find_overlapping_iter(text) {
                    sum += m.end() + m.value() as usize;
                }
            }
            if sum == 0 {
                panic!();
            }
        });
    });

    group.bench_function("lazyac/frozen", |b| {
        let pma = lazyac::FrozenAutomaton::from_patterns(keys).unwrap();
        b.iter(|| {
            let mut sum = 0;
            for text in texts {
                for m in pma.find_overlapping_iter(text) {
                    sum += m.end() + m.value() as usize;
                }
            }
            if sum == 0 {
                panic!();
            }
        });
    });

    group.bench_function("daachorse", |b| {
        let pma = daachorse::DoubleArrayAhoCorasick::new(keys).unwrap();
        b.iter(|| {
            let mut sum = 0;
            for text in texts {
                for m in pma.find_overlapping_iter(text) {
                    sum += m.end() + m.value() as usize;
                }
            }
            if sum == 0 {
                panic!();
            }
        });
    });
}

fn make_keys() -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(13);
    let mut keys: Vec<Vec<u8>> = (0..NUM_KEYS)
        .map(|_| {
            let len = rng.gen_range(2..=8);
            (0..len).map(|_| rng.gen_range(b'a'..=b'p')).collect()
        })
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}

fn make_texts() -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(17);
    (0..NUM_TEXTS)
        .map(|_| (0..TEXT_LEN).map(|_| rng.gen_range(b'a'..=b'z')).collect())
        .collect()
}

criterion_group!(benches, criterion_random_exact, criterion_random_scan);
criterion_main!(benches);
