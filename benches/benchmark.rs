use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rainflow_fatigue::{
    count_cycles, extract_cycles, rainflow_report, Binning, MatrixInput, MatrixOptions,
};
use rand::distributions::{Distribution, Uniform};

fn random_signal(len: usize) -> Vec<f64> {
    let step = Uniform::new(0.0, 50.0);
    let mut rng = rand::thread_rng();
    step.sample_iter(&mut rng).take(len).collect()
}

fn bench_rainflow(c: &mut Criterion) {
    let choices = random_signal(100000);
    c.bench_function("Rainflow cycle extraction on large dataset", |b| {
        b.iter(|| extract_cycles(black_box(&choices)).count());
    });
    c.bench_function("Rainflow counting with fixed bin count", |b| {
        b.iter(|| count_cycles(black_box(&choices), Binning::FixedBinCount(64)).unwrap());
    });
    c.bench_function("Rainflow matrix on large dataset", |b| {
        b.iter(|| {
            let options = Some(MatrixOptions::default());
            rainflow_report(MatrixInput::Signal(black_box(&choices)), options).unwrap()
        });
    });
}

criterion_group!(benches, bench_rainflow);
criterion_main!(benches);
