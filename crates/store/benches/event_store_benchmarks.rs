use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use serde::{Deserialize, Serialize};

use chronicle_core::{ExpectedVersion, StreamName};
use chronicle_events::{
    DomainEvent, DomainEvents, Event, JsonEventCodec, ListenerError, ListenerRegistry, SyncEventBus,
};
use chronicle_store::{EventStore, InMemoryEventStorage};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemCounted {
    sku: String,
    quantity: i64,
}

impl Event for ItemCounted {
    fn event_type(&self) -> &'static str {
        "inventory.item_counted"
    }
}

type BenchStore = EventStore<
    InMemoryEventStorage,
    JsonEventCodec<ItemCounted>,
    SyncEventBus<ItemCounted>,
    ItemCounted,
>;

fn setup_store(listeners: usize) -> (BenchStore, Arc<AtomicU64>) {
    let seen = Arc::new(AtomicU64::new(0));
    let mut registry = ListenerRegistry::<ItemCounted>::new();
    for i in 0..listeners {
        let seen = Arc::clone(&seen);
        registry.register_fn("inventory.item_counted", format!("Projection{i}"), "when", move |_| {
            seen.fetch_add(1, Ordering::Relaxed);
            Ok::<(), ListenerError>(())
        });
    }
    let store = EventStore::new(
        InMemoryEventStorage::new(),
        JsonEventCodec::new(),
        SyncEventBus::new(registry),
    );
    (store, seen)
}

fn batch(size: usize) -> DomainEvents<ItemCounted> {
    (0..size)
        .map(|i| {
            DomainEvent::new(ItemCounted {
                sku: format!("SKU-{i}"),
                quantity: i as i64,
            })
            .with_metadata_entry("source", "bench")
        })
        .collect()
}

fn bench_commit_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit_throughput");

    for batch_size in [1, 10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*batch_size as u64));
        group.bench_with_input(
            BenchmarkId::new("batch_commit", batch_size),
            batch_size,
            |b, &size| {
                let (store, _) = setup_store(0);
                let events = batch(size);
                let mut n = 0u64;
                b.iter(|| {
                    n += 1;
                    let stream = StreamName::new(format!("item-{n}")).unwrap();
                    store
                        .commit(&stream, black_box(events.clone()), ExpectedVersion::NoStream)
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_dispatch_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_fanout");

    for listeners in [0, 1, 10, 50].iter() {
        group.bench_with_input(
            BenchmarkId::new("listeners", listeners),
            listeners,
            |b, &count| {
                let (store, _) = setup_store(count);
                let stream = StreamName::new("item-fanout").unwrap();
                let events = batch(10);
                b.iter(|| {
                    store
                        .commit(&stream, black_box(events.clone()), ExpectedVersion::Any)
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_load_and_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("load_and_decode");

    for event_count in [10, 100, 1000, 10000].iter() {
        group.throughput(Throughput::Elements(*event_count as u64));
        group.bench_with_input(
            BenchmarkId::new("replay_stream", event_count),
            event_count,
            |b, &count| {
                let (store, _) = setup_store(0);
                let stream = StreamName::new("item-replay").unwrap();
                store
                    .commit(&stream, batch(count), ExpectedVersion::NoStream)
                    .unwrap();

                b.iter(|| {
                    let total: i64 = store
                        .load_stream(&stream)
                        .unwrap()
                        .map(|raw| raw.decode::<ItemCounted, _>(store.codec()).unwrap().quantity)
                        .sum();
                    black_box(total);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_commit_throughput,
    bench_dispatch_fanout,
    bench_load_and_decode
);
criterion_main!(benches);
