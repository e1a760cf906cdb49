#[path = "../tests/fixtures/mod.rs"]
mod fixtures;

use crate::fixtures::{date, load_session_bars};

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use quantedge_sessions::{
    Cvd, CvdConfig, Ib, IbConfig, PriorRth, PriorRthConfig, Rth, RthConfig,
};
use std::{hint::black_box, time::Duration};

fn stream_benchmarks(c: &mut Criterion) {
    let bars = load_session_bars();
    let mut group = c.benchmark_group("stream");
    group.throughput(Throughput::Elements(bars.len() as u64));
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(10));

    macro_rules! stream_bench {
        ($name:expr, $ind_type:ty, $config:expr) => {
            group.bench_function($name, |b| {
                b.iter_batched(
                    || <$ind_type>::new($config),
                    |mut ind| {
                        for (i, bar) in bars.iter().enumerate() {
                            black_box(ind.compute(bar, i, bars.as_slice()));
                        }
                    },
                    BatchSize::SmallInput,
                );
            });
        };
    }

    stream_bench!("ib60", Ib, IbConfig::default());
    stream_bench!("rth", Rth, RthConfig::default());
    stream_bench!("prior_rth", PriorRth, PriorRthConfig::default());
    stream_bench!("cvd", Cvd, CvdConfig::default());

    group.finish();
}

fn tick_benchmarks(c: &mut Criterion) {
    let bars = load_session_bars();
    let mut group = c.benchmark_group("tick");
    group.sample_size(200);
    group.noise_threshold(0.03);
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(10));

    // Pre-feed all bars except the last, then benchmark a single compute() call.
    let last = bars.len() - 1;

    macro_rules! tick_bench {
        ($name:expr, $ind_type:ty, $config:expr) => {
            group.bench_function($name, |b| {
                b.iter_batched(
                    || {
                        let mut ind = <$ind_type>::new($config);
                        for (i, bar) in bars[..last].iter().enumerate() {
                            ind.compute(bar, i, bars.as_slice());
                        }
                        ind
                    },
                    |mut ind| {
                        black_box(ind.compute(&bars[last], last, bars.as_slice()));
                    },
                    BatchSize::SmallInput,
                );
            });
        };
    }

    tick_bench!("ib60", Ib, IbConfig::default());
    tick_bench!("rth", Rth, RthConfig::default());
    tick_bench!("prior_rth", PriorRth, PriorRthConfig::default());
    tick_bench!("cvd", Cvd, CvdConfig::default());

    group.finish();
}

fn rollover_benchmarks(c: &mut Criterion) {
    let bars = load_session_bars();
    let mut group = c.benchmark_group("rollover");
    group.sample_size(200);
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(10));

    // First bar of the last day: the prior-session scan walks back over a
    // whole day of history.
    let first = bars
        .iter()
        .position(|b| b.timestamp.date() == date(6))
        .expect("fixture covers 2024-03-06");

    group.bench_function("prior_rth", |b| {
        b.iter_batched(
            || {
                let mut ind = PriorRth::new(PriorRthConfig::default());
                for (i, bar) in bars[..first].iter().enumerate() {
                    ind.compute(bar, i, bars.as_slice());
                }
                ind
            },
            |mut ind| {
                black_box(ind.compute(&bars[first], first, bars.as_slice()));
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    stream_benchmarks,
    tick_benchmarks,
    rollover_benchmarks
);
criterion_main!(benches);
