//! Criterion benchmarks for paramsync-dispatch hot paths
//!
//! Run with: cargo bench -p paramsync-dispatch
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use paramsync_core::{Parameter, ParameterObserver, Payload, Priority};
use paramsync_dispatch::{ChangeRecord, Scheduler};

const BURST_SIZES: &[usize] = &[1, 16, 64, 256];

struct Sink;

impl ParameterObserver for Sink {
    fn priority(&self) -> Priority {
        Priority::Realtime
    }

    fn on_parameter_updated(&self, parameter: &Parameter) {
        black_box(parameter.value());
    }
}

fn bench_realtime_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("RealtimeDrain");

    let param = Arc::new(Parameter::float("Cutoff", 20.0, 20000.0, 1000.0));
    param.add_observer(Arc::new(Sink));

    for &burst in BURST_SIZES {
        let scheduler = Scheduler::new(burst);

        group.bench_with_input(BenchmarkId::new("schedule_and_drain", burst), &burst, |b, &burst| {
            b.iter(|| {
                for i in 0..burst {
                    scheduler.schedule(ChangeRecord::new(
                        Arc::clone(&param),
                        Payload::Normalized(i as f64 / burst as f64),
                        Priority::Realtime,
                        None,
                    ));
                }
                black_box(scheduler.process(Priority::Realtime));
                // Discard the forwarded notify step so queues stay bounded.
                black_box(scheduler.process(Priority::Async));
            });
        });
    }

    group.bench_function("empty_drain", |b| {
        let scheduler = Scheduler::new(64);
        b.iter(|| black_box(scheduler.process(Priority::Realtime)));
    });

    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("Apply");

    let float = Parameter::frequency("Cutoff", 20.0, 20000.0, 1000.0);
    group.bench_function("normalized_log", |b| {
        b.iter(|| float.apply(black_box(&Payload::Normalized(0.5))));
    });

    let blob = Parameter::blob("State");
    let buffer = Payload::Data(Arc::new(vec![0u8; 4096]));
    group.bench_function("blob_swap", |b| {
        b.iter(|| black_box(blob.apply(black_box(&buffer))));
    });

    group.finish();
}

criterion_group!(benches, bench_realtime_drain, bench_apply);

criterion_main!(benches);
