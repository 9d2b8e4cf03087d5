//! # Poultry-Ledger Store Benchmarks
//!
//! | Operation | Workload |
//! |-----------|----------|
//! | `update_inventory_quantity` | single movement with audit record |
//! | `get_low_stock_items` | full scan over N items |
//! | `get_financial_summary` | date-range scan over N transactions |
//! | `backup` | every store |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use chrono::Duration as ChronoDuration;
use rand::Rng;
use std::time::Duration;
use tokio::runtime::Runtime;

use pl_01_persistence::{FarmStoreApi, TimeSource};
use pl_tests::fixtures::{empty_store, item, TestStore};
use shared_schema::{RecordKey, StoreName, TransactionDraft, TransactionKind};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn stocked_store(rt: &Runtime, items: i64) -> TestStore {
    let (store, _) = empty_store();
    let mut rng = rand::thread_rng();
    rt.block_on(async {
        for id in 1..=items {
            let qty = f64::from(rng.gen_range(0..1000_i32));
            let min_stock = f64::from(rng.gen_range(0..500_i32));
            store
                .add(StoreName::Inventory, item(id, qty, min_stock, 2.0))
                .await
                .unwrap();
        }
    });
    store
}

fn bench_inventory_movements(c: &mut Criterion) {
    let mut group = c.benchmark_group("pl-01-inventory");
    group.measurement_time(Duration::from_secs(5));
    let rt = runtime();
    let store = stocked_store(&rt, 100);
    rt.block_on(store.update_inventory_quantity(&RecordKey::Int(1), 1_000_000.0, "bench"))
        .unwrap();

    group.bench_function("update_inventory_quantity", |b| {
        b.iter(|| {
            rt.block_on(store.update_inventory_quantity(&RecordKey::Int(1), -1.0, "bench"))
                .unwrap()
        })
    });

    for size in [100_i64, 1_000, 5_000] {
        let store = stocked_store(&rt, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("get_low_stock_items", size), &size, |b, _| {
            b.iter(|| black_box(rt.block_on(store.get_low_stock_items()).unwrap()))
        });
    }
    group.finish();
}

fn bench_finance(c: &mut Criterion) {
    let mut group = c.benchmark_group("pl-01-finance");
    let rt = runtime();

    for size in [100_usize, 1_000] {
        let (store, clock) = empty_store();
        rt.block_on(async {
            for i in 0..size {
                let kind = if i % 3 == 0 {
                    TransactionKind::Expense
                } else {
                    TransactionKind::Income
                };
                store
                    .add_financial_transaction(TransactionDraft::new(kind, 10.0))
                    .await
                    .unwrap();
                clock.advance(ChronoDuration::minutes(5));
            }
        });
        let end = clock.now();
        let start = end - ChronoDuration::days(1);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("get_financial_summary", size), &size, |b, _| {
            b.iter(|| black_box(rt.block_on(store.get_financial_summary(start, end)).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("backup", size), &size, |b, _| {
            b.iter(|| black_box(rt.block_on(store.backup()).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_inventory_movements, bench_finance);
criterion_main!(benches);
