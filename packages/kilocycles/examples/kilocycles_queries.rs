//! Example demonstrating direct cycle queries with `kilocycles`.
//!
//! Queries the calling thread, the whole process and every processor's idle
//! thread, then samples a tracker repeatedly around some work.
//!
//! Run with: `cargo run --example kilocycles_queries`

use std::hint::black_box;
use std::thread;
use std::time::Duration;

use kilocycles::{CycleCounter, Error, ProcessSubject, Subject};

fn main() {
    println!("=== Direct Cycle Query Example ===\n");

    let counter = CycleCounter::new();

    let thread_before = counter
        .thread_cycles()
        .expect("thread cycle accounting should be available on this platform");

    black_box("kilocycles".repeat(100_000));

    let thread_after = counter
        .thread_cycles()
        .expect("thread cycle accounting should be available on this platform");

    println!(
        "Calling thread consumed {} cycle units building strings.",
        thread_after
            .delta_since(thread_before)
            .expect("thread counters are monotonic")
    );

    let process = counter
        .process_cycles(ProcessSubject::current())
        .expect("process cycle accounting should be available on this platform");
    println!(
        "This process has consumed {} cycle units since it started.",
        process.count()
    );

    // Idle accounting covers the whole machine, one entry per processor.
    match counter.idle_processor_cycles() {
        Ok(idle_before) => {
            thread::sleep(Duration::from_millis(200));

            let idle_after = counter
                .idle_processor_cycles()
                .expect("idle accounting availability does not change at runtime");

            println!("\nIdle consumption during a 200ms nap:");
            for (index, (before, after)) in idle_before.iter().zip(idle_after.iter()).enumerate() {
                let delta = after.count().saturating_sub(before.count());
                println!("  processor {index}: {delta} cycle units");
            }
        }
        Err(Error::CounterUnavailable { .. }) => {
            println!("\nThis platform does not expose idle processor accounting.");
        }
        Err(error) => panic!("unexpected idle query failure: {error}"),
    }

    // A tracker samples one subject repeatedly against a fixed start.
    let tracker = counter
        .start_tracking(Subject::CurrentThread)
        .expect("thread cycle accounting should be available on this platform");

    println!();
    for round in 1..=3 {
        black_box("kilocycles".repeat(100_000));

        let elapsed = tracker.elapsed().expect("thread counters are monotonic");
        println!("After round {round}: {elapsed} cycle units since tracking began.");
    }
}
