//! Benchmarks for gated fan-out and scheduling.
//!
//! Benchmarks cover:
//! - Gate acquire/release under no contention
//! - ConcurrentExecutor fan-out at several batch sizes and capacities
//! - SyncExecutor baseline for the same batches
//! - TaskScheduler submit-to-drain throughput

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nolan::config::SchedulerConfig;
use nolan::core::{
    delegate_fn, ConcurrentExecutor, Context, Executor, Gate, SharedDelegate, SyncExecutor,
    TaskScheduler,
};
use tokio::runtime::Runtime;

// ============================================================================
// Helper Functions
// ============================================================================

fn counting_delegate(counter: &Arc<AtomicU64>) -> SharedDelegate<u64> {
    let counter = Arc::clone(counter);
    delegate_fn(move |_ctx: Context, n: u64| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(black_box(n), Ordering::Relaxed);
            tokio::task::yield_now().await;
            Ok(())
        }
    })
}

fn plan(size: u64, counter: &Arc<AtomicU64>) -> Vec<SharedDelegate<u64>> {
    (0..size).map(|_| counting_delegate(counter)).collect()
}

// ============================================================================
// Gate Benchmarks
// ============================================================================

fn bench_gate_acquire_release(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let gate = Gate::new(8);
    let ctx = Context::background();

    c.bench_function("gate_acquire_release", |b| {
        b.to_async(&rt).iter(|| async {
            let permit = gate.acquire(&ctx).await.unwrap();
            black_box(&permit);
            permit.release();
        });
    });
}

// ============================================================================
// Executor Benchmarks
// ============================================================================

fn bench_concurrent_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_fan_out");
    let counter = Arc::new(AtomicU64::new(0));

    for capacity in [1_usize, 4, 16] {
        for size in [16_u64, 256] {
            group.throughput(Throughput::Elements(size));
            group.bench_with_input(
                BenchmarkId::new(format!("capacity_{capacity}"), size),
                &size,
                |b, &size| {
                    let executor = ConcurrentExecutor::new(capacity);
                    b.to_async(Runtime::new().unwrap()).iter(|| async {
                        executor
                            .execute_all(&Context::background(), 1, plan(size, &counter))
                            .await
                            .unwrap();
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_sync_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_baseline");
    let counter = Arc::new(AtomicU64::new(0));

    for size in [16_u64, 256] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.to_async(Runtime::new().unwrap()).iter(|| async {
                SyncExecutor
                    .execute_all(&Context::background(), 1, plan(size, &counter))
                    .await
                    .unwrap();
            });
        });
    }
    group.finish();
}

// ============================================================================
// Scheduler Benchmarks
// ============================================================================

fn bench_scheduler_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_throughput");
    group.sample_size(20);

    for jobs in [100_u64, 1_000] {
        group.throughput(Throughput::Elements(jobs));
        group.bench_with_input(BenchmarkId::from_parameter(jobs), &jobs, |b, &jobs| {
            b.to_async(Runtime::new().unwrap()).iter(|| async move {
                let counter = Arc::new(AtomicU64::new(0));
                let scheduler = Arc::new(
                    TaskScheduler::new(
                        SchedulerConfig::new()
                            .with_max_concurrent_workers(16)
                            .with_queue_capacity(64),
                        counting_delegate(&counter),
                    )
                    .unwrap(),
                );
                let dispatch = {
                    let scheduler = Arc::clone(&scheduler);
                    tokio::spawn(async move { scheduler.start().await })
                };

                for n in 0..jobs {
                    scheduler.submit_work(n).await.unwrap();
                }
                scheduler.stop(&Context::background()).await.unwrap();
                dispatch.await.unwrap().unwrap();
                black_box(counter.load(Ordering::Relaxed));
            });
        });
    }
    group.finish();
}

criterion_group!(gate_benches, bench_gate_acquire_release);

criterion_group!(executor_benches, bench_concurrent_fan_out, bench_sync_baseline);

criterion_group!(scheduler_benches, bench_scheduler_throughput);

criterion_main!(gate_benches, executor_benches, scheduler_benches);
