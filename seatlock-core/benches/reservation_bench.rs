use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use seatlock_core::infrastructure::SeatStore;
use seatlock_core::infrastructure_in_memory::InMemorySeatStore;
use seatlock_core::state::Seat;
use seatlock_core::types::Principal;

const MINUTE: u64 = 60_000;

// ─── Benchmarks ─────────────────────────────────────────────────────────────

fn bench_seat_lock_confirm(c: &mut Criterion) {
    c.bench_function("seat_lock_confirm_cycle", |b| {
        b.iter(|| {
            let mut seat = Seat::new("1");
            let grant = seat.lock(black_box("alice"), 1000, MINUTE);
            let booking = seat.confirm(black_box("alice"), 2000);
            black_box((grant, booking))
        })
    });
}

fn bench_seat_lock_unlock(c: &mut Criterion) {
    let principal = Principal::user("alice");
    let mut seat = Seat::new("1");

    c.bench_function("seat_lock_unlock_cycle", |b| {
        b.iter(|| {
            let _ = seat.lock(black_box("alice"), 1000, MINUTE);
            black_box(seat.unlock(&principal))
        })
    });
}

fn bench_store_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_sweep_expired");

    for count in [20, 200, 2000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut store = InMemorySeatStore::with_numbered_seats(count);
                for i in 1..=count {
                    let _ = store.lock(&i.to_string(), "agent", 1000, MINUTE);
                }
                black_box(store.sweep_expired(1000 + MINUTE).len())
            })
        });
    }

    group.finish();
}

fn bench_store_snapshot(c: &mut Criterion) {
    let mut store = InMemorySeatStore::with_numbered_seats(500);
    for i in (1..=500).step_by(2) {
        let _ = store.lock(&i.to_string(), "alice", 1000, MINUTE);
    }

    c.bench_function("store_snapshot_500", |b| {
        b.iter(|| black_box(store.snapshot(black_box(2000))))
    });
}

criterion_group!(
    benches,
    bench_seat_lock_confirm,
    bench_seat_lock_unlock,
    bench_store_sweep,
    bench_store_snapshot,
);
criterion_main!(benches);
