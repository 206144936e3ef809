//! Full transaction benchmarks over the loopback bus
//!
//! Measures driver overhead per frame, excluding wire time.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lin_master::transport::{LoopbackBus, ManualClock};
use lin_master::{ChecksumMode, Frame, LinMaster, MasterConfig, State};

fn master() -> LinMaster<LoopbackBus, ManualClock> {
    let clock = ManualClock::new(0);
    let mut bus = LoopbackBus::new(clock.clone());
    bus.respond(0x10, &[0u8; 8], ChecksumMode::Enhanced).unwrap();
    let mut master = LinMaster::new(bus, clock, MasterConfig::default());
    master.begin().unwrap();
    master
}

fn bench_transactions(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction");

    // Master request, 8 data bytes
    group.bench_function("master_request_8b", |b| {
        let mut master = master();
        let frame = Frame::master_write(0x20, &[0xA5; 8], ChecksumMode::Enhanced).unwrap();
        b.iter(|| {
            master.start_transaction(&frame).unwrap();
            while master.poll() != State::Done {}
            black_box(master.errors());
        });
    });

    // Slave response, 8 data bytes
    group.bench_function("slave_response_8b", |b| {
        let mut master = master();
        let frame = Frame::master_read(0x10, 8, ChecksumMode::Enhanced).unwrap();
        b.iter(|| {
            master.start_transaction(&frame).unwrap();
            while master.poll() != State::Done {}
            black_box(master.result());
        });
    });

    // Polling an idle master
    group.bench_function("poll_idle", |b| {
        let mut master = master();
        b.iter(|| black_box(master.poll()));
    });

    group.finish();
}

criterion_group!(benches, bench_transactions);
criterion_main!(benches);
