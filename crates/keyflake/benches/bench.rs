use core::hint::black_box;
use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use keyflake::{
    AtomicSnowflakeGenerator, Cursor, Filter, IdMinter, KeysetPaginator, LockSnowflakeGenerator,
    MonotonicClock, PageRequest, PageSize, Poll, Record, RecordId, RollbackPolicy,
    SnowflakeGenerator, SortDirection, TimeSource, Value, page::MemoryCollection,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// Benchmarks a hot-path generator where IDs are always `Ready`.
fn bench_generator<G>(c: &mut Criterion, group_name: &str, generator_factory: impl Fn() -> G)
where
    G: SnowflakeGenerator<RecordId>,
{
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = generator_factory();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id().unwrap() {
                        Poll::Ready { id } => {
                            black_box(id);
                        }
                        Poll::Pending { .. } | Poll::ClockBehind { .. } => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks a minter shared across threads on a real clock, including the
/// waits after sequence exhaustion.
fn bench_minter_contended<G>(c: &mut Criterion, group_name: &str, minter_fn: impl Fn() -> IdMinter<G>)
where
    G: SnowflakeGenerator<RecordId> + Send + Sync,
{
    let mut group = c.benchmark_group(group_name);
    let max_threads = num_cpus::get().max(1);

    for thread_count in [1, 2, 4, 8, 16].into_iter().filter(|n| *n <= max_threads) {
        let ids_per_thread = TOTAL_IDS / thread_count;

        group.throughput(Throughput::Elements(TOTAL_IDS as u64));
        group.bench_function(format!("elems/{TOTAL_IDS}/threads/{thread_count}"), |b| {
            b.iter_custom(|iters| {
                let start = Instant::now();

                for _ in 0..iters {
                    let minter = minter_fn();
                    let barrier = Arc::new(Barrier::new(thread_count + 1));
                    scope(|s| {
                        for _ in 0..thread_count {
                            let minter = minter.clone();
                            let barrier = Arc::clone(&barrier);
                            s.spawn(move || {
                                barrier.wait();
                                for _ in 0..ids_per_thread {
                                    black_box(minter.next_record_id().unwrap());
                                }
                            });
                        }
                        barrier.wait();
                    });
                }

                start.elapsed()
            });
        });
    }

    group.finish();
}

#[derive(Clone)]
struct Row {
    id: RecordId,
    created_at: i64,
}

impl Record for Row {
    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "created_at").then_some(Value::Timestamp(self.created_at))
    }
}

fn rows(n: u64) -> Vec<Row> {
    (0..n)
        .map(|i| Row {
            id: RecordId::from(i, 1, 0),
            created_at: i64::try_from(i / 4).unwrap_or(i64::MAX),
        })
        .collect()
}

fn bench_pagination(c: &mut Criterion) {
    let mut group = c.benchmark_group("pagination");
    let paginator = KeysetPaginator::new("created_at", SortDirection::Descending);
    let size = PageSize::new(50).unwrap();

    group.throughput(Throughput::Elements(51));
    group.bench_function("trim_page/51", |b| {
        b.iter_batched(
            || rows(51),
            |rows| black_box(paginator.trim_page(rows, size).unwrap()),
            BatchSize::SmallInput,
        );
    });

    let cursor = Cursor::new(Value::Timestamp(1_700_000_000_000), RecordId::from(7, 1, 3));
    group.throughput(Throughput::Elements(1));
    group.bench_function("cursor/encode", |b| b.iter(|| black_box(cursor.encode())));
    let token = cursor.encode();
    group.bench_function("cursor/decode", |b| {
        b.iter(|| black_box(Cursor::decode(black_box(&token)).unwrap()))
    });

    let collection: MemoryCollection<Row> = rows(10_000).into_iter().collect();
    let first = paginator
        .paginate(&collection, &PageRequest::first(Filter::All, size))
        .unwrap();
    let request = PageRequest::first(Filter::All, size).next(&first).unwrap();
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("paginate/memory/10000", |b| {
        b.iter(|| black_box(paginator.paginate(&collection, &request).unwrap()));
    });

    group.finish();
}

fn benchmark_mock_sequential(c: &mut Criterion) {
    bench_generator::<LockSnowflakeGenerator<RecordId, _>>(c, "mock/sequential/lock", || {
        LockSnowflakeGenerator::from_components(0, 0, 0, FixedMockTime { millis: 1 })
    });
    bench_generator::<AtomicSnowflakeGenerator<RecordId, _>>(c, "mock/sequential/atomic", || {
        AtomicSnowflakeGenerator::from_components(0, 0, 0, FixedMockTime { millis: 1 })
    });
}

fn benchmark_minter_contended(c: &mut Criterion) {
    let clock = MonotonicClock::try_default().unwrap();
    let lock_clock = clock.clone();
    bench_minter_contended(c, "mono/minter/lock", move || {
        IdMinter::new(
            LockSnowflakeGenerator::<RecordId, _>::try_new(0, lock_clock.clone()).unwrap(),
            RollbackPolicy::default(),
        )
    });
    bench_minter_contended(c, "mono/minter/atomic", move || {
        IdMinter::new(
            AtomicSnowflakeGenerator::<RecordId, _>::try_new(0, clock.clone()).unwrap(),
            RollbackPolicy::default(),
        )
    });
}

criterion_group!(
    benches,
    benchmark_mock_sequential,
    benchmark_minter_contended,
    bench_pagination,
);
criterion_main!(benches);
