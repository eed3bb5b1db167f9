//! Example demonstrating basic usage of `kilocycles`.
//!
//! Brackets a few operations with the repeat loop, prints the report records
//! and reads the settled measurements programmatically.
//!
//! Run with: `cargo run --example kilocycles_basic`

use std::hint::black_box;

use kilocycles::Timer;

fn main() {
    println!("=== Bracketed Measurement Example ===\n");

    let timer = Timer::new();

    // A blank label measures silently; one silent run absorbs warm-up
    // effects such as cold caches before the reported runs.
    timer
        .repeat("", false, 10_000, || {
            black_box(build_greeting("warmup"));
        })
        .expect("cycle counters should be available on this platform");

    // Labeled runs print their two-line report record on close.
    timer
        .repeat("greeting via format!", false, 10_000, || {
            black_box(build_greeting("world"));
        })
        .expect("cycle counters should be available on this platform");

    let pushed = timer
        .repeat("greeting via push_str", false, 10_000, || {
            black_box(push_greeting("world"));
        })
        .expect("cycle counters should be available on this platform");

    println!();
    println!("The last measurement, read programmatically:");
    println!("  label:      {}", pushed.label());
    println!("  wall time:  {:?}", pushed.wall_time());
    println!("  cycles:     {}", pushed.elapsed_cycles());
    println!("  kilocycles: {}", pushed.elapsed_kilocycles());
}

fn build_greeting(name: &str) -> String {
    format!("Hello, {name}!")
}

fn push_greeting(name: &str) -> String {
    let mut greeting = String::with_capacity(16);
    greeting.push_str("Hello, ");
    greeting.push_str(name);
    greeting.push('!');
    greeting
}
