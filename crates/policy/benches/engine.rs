use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{TimeZone, Utc};
use restock_core::ItemId;
use restock_inventory::{Item, Unit};
use restock_policy::{DecisionEngine, PolicyParams};

/// Mixed batch: every fourth item has no rate, every seventh is auto-subscribed.
fn batch(size: usize) -> Vec<Item> {
    (0..size)
        .map(|i| {
            let mut b = Item::builder(
                ItemId::new(format!("item-{i}")).unwrap(),
                format!("Item {i}"),
                Unit::VolumeMl,
                (i % 500) as f64,
            )
            .pack_size(250.0)
            .lead_time_days((i % 5) as f64)
            .auto_subscription(i % 7 == 0);
            if i % 4 != 0 {
                b = b.daily_consumption(1.0 + (i % 13) as f64);
            }
            b.build().unwrap()
        })
        .collect()
}

fn bench_evaluate_batch(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut group = c.benchmark_group("evaluate_batch");

    for size in [100usize, 1_000, 10_000] {
        let items = batch(size);
        let engine = DecisionEngine::new(PolicyParams::default().with_projection(true));

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| black_box(engine.evaluate_all(black_box(items), now)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate_batch);
criterion_main!(benches);
