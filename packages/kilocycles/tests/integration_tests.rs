//! Integration tests for `kilocycles` against the real platform.
//!
//! These tests verify that real processor work shows up in the measured
//! intervals and that the measurement pipeline holds together end to end.

#![cfg(any(windows, target_os = "linux"))]

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use kilocycles::{CycleCounter, ProcessSubject, Subject, ThreadSubject, Timer};

/// Spins the processor long enough to be visible in any cycle accounting.
///
/// Returns the accumulator so the work cannot be optimized away.
fn spin(rounds: u64) -> u64 {
    let mut accumulator = 0_u64;

    for i in 0..rounds {
        accumulator = accumulator.wrapping_mul(31).wrapping_add(i).rotate_left(7);
    }

    black_box(accumulator)
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn warmup_then_labeled_run_shows_progression() {
    let timer = Timer::new();

    let warmup = timer.repeat("", false, 0, || {}).unwrap();
    assert!(warmup.is_silent());

    let measured = timer
        .repeat("add loop", false, 200, || {
            black_box(spin(10_000));
        })
        .unwrap();

    assert!(!measured.is_silent());
    assert!(
        measured.elapsed_cycles() > warmup.elapsed_cycles(),
        "two million spins must consume more than an empty bracket, got {} vs {}",
        measured.elapsed_cycles(),
        warmup.elapsed_cycles()
    );
    assert!(measured.collection_deltas().gen0() >= 0);
    assert!(measured.collection_deltas().gen1() >= 0);
    assert!(measured.collection_deltas().gen2() >= 0);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn concurrent_sessions_measure_their_own_threads() {
    let light = thread::spawn(|| {
        let timer = Timer::new();
        let session = timer.begin("", false).unwrap();
        black_box(spin(50_000));
        session.close().unwrap()
    });

    let heavy = thread::spawn(|| {
        let timer = Timer::new();
        let session = timer.begin("", false).unwrap();
        black_box(spin(5_000_000));
        session.close().unwrap()
    });

    let light = light.join().unwrap();
    let heavy = heavy.join().unwrap();

    assert!(
        heavy.elapsed_cycles() > light.elapsed_cycles(),
        "the heavier thread must consume more of its own counter, got {} vs {}",
        heavy.elapsed_cycles(),
        light.elapsed_cycles()
    );
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn tracker_observes_accumulating_consumption() {
    let counter = CycleCounter::new();
    let tracker = counter.start_tracking(Subject::CurrentThread).unwrap();

    black_box(spin(1_000_000));
    let first = tracker.elapsed().unwrap();

    black_box(spin(1_000_000));
    let second = tracker.elapsed().unwrap();

    assert!(
        first > 0,
        "a million spins must register on the thread counter"
    );
    assert!(second >= first);
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn live_worker_thread_can_be_queried_by_handle() {
    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = Arc::clone(&stop);

    let worker = thread::spawn(move || {
        let mut accumulator = 0_u64;

        while !worker_stop.load(Ordering::Relaxed) {
            accumulator = accumulator.wrapping_add(1);
        }

        black_box(accumulator);
    });

    let subject = ThreadSubject::from_join_handle(&worker);
    let counter = CycleCounter::new();

    // Give the worker time to accumulate something measurable.
    thread::sleep(Duration::from_millis(50));

    let snapshot = counter.thread_cycles_of(subject).unwrap();

    stop.store(true, Ordering::Relaxed);
    worker.join().unwrap();

    assert!(
        snapshot.count() > 0,
        "a spinning worker must have consumed cycles by the time we query it"
    );
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn process_consumption_covers_all_threads() {
    let counter = CycleCounter::new();

    let before = counter.process_cycles(ProcessSubject::current()).unwrap();
    black_box(spin(1_000_000));
    let after = counter.process_cycles(ProcessSubject::current()).unwrap();

    assert!(before.count() > 0);
    assert!(after.count() >= before.count());
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn idle_snapshots_cover_every_processor() {
    let counter = CycleCounter::new();

    let first = counter.idle_processor_cycles().unwrap();
    assert!(!first.is_empty());

    let second = counter.idle_processor_cycles().unwrap();
    assert_eq!(first.len(), second.len());

    // Idle accounting is cumulative, so every processor's second reading is
    // at least its first.
    for (earlier, later) in first.iter().zip(second.iter()) {
        assert!(later.count() >= earlier.count());
    }
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn repeat_runs_the_operation_the_exact_number_of_times() {
    let mut invocations = 0_u64;

    let measurement = kilocycles::repeat("", false, 12_345, || {
        invocations = invocations.wrapping_add(1);
    })
    .unwrap();

    assert_eq!(invocations, 12_345);
    assert!(measurement.is_silent());
}

#[test]
#[cfg_attr(miri, ignore)] // Miri cannot use the real operating system APIs.
fn report_record_has_the_expected_shape() {
    let session = kilocycles::begin("shape check", false).unwrap();
    black_box(spin(100_000));
    let measurement = session.close().unwrap();

    let record = measurement.to_string();
    let mut lines = record.lines();

    assert_eq!(lines.next(), Some("   shape check"));

    let metrics = lines.next().expect("metrics line missing");
    assert!(metrics.contains("ms "));
    assert!(metrics.contains("Kc (G0="));
    assert!(metrics.ends_with(')'));

    assert_eq!(lines.next(), None);
}
