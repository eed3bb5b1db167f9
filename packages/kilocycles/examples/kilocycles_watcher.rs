//! Example demonstrating collector probes and the collection watcher.
//!
//! `kilocycles` does not assume a collected runtime. A `CollectorProbe`
//! supplies collection counts from wherever they live; this example wires a
//! simulated collector into both the report pipeline and the background
//! watcher.
//!
//! Run with: `cargo run --example kilocycles_watcher`

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use kilocycles::{CollectionCounts, CollectionWatcher, CollectorProbe, Timer};

/// A simulated collector whose counts the demo bumps by hand. A forced
/// collection registers as one generation 0 sweep, like a real collector
/// whose forced cycle shows up in its own statistics.
#[derive(Clone, Debug, Default)]
struct DemoProbe {
    gen0: Arc<AtomicU64>,
    gen1: Arc<AtomicU64>,
}

impl DemoProbe {
    fn record_minor_collection(&self) {
        self.gen0.fetch_add(1, Ordering::Relaxed);
    }

    fn record_major_collection(&self) {
        self.gen0.fetch_add(1, Ordering::Relaxed);
        self.gen1.fetch_add(1, Ordering::Relaxed);
    }
}

impl CollectorProbe for DemoProbe {
    fn collection_counts(&self) -> CollectionCounts {
        CollectionCounts::new(
            self.gen0.load(Ordering::Relaxed),
            self.gen1.load(Ordering::Relaxed),
            0,
        )
    }

    fn force_collect(&self) {
        self.record_minor_collection();
    }
}

fn main() {
    println!("=== Collector Probe and Watcher Example ===\n");

    let probe = DemoProbe::default();

    // The watcher reports activity deltas from a background thread.
    let watcher = CollectionWatcher::spawn(probe.clone(), Duration::from_millis(10), |deltas| {
        println!(
            "[watcher] collections observed: G0={}, G1={}, G2={}",
            deltas.gen0(),
            deltas.gen1(),
            deltas.gen2()
        );
    });

    // Let the watcher take its starting counts before activity begins.
    thread::sleep(Duration::from_millis(30));

    probe.record_minor_collection();
    probe.record_major_collection();
    thread::sleep(Duration::from_millis(50));

    // While silenced, activity passes without reports.
    watcher.set_silenced(true);
    probe.record_minor_collection();
    thread::sleep(Duration::from_millis(50));
    println!("(a collection went unreported while silenced)");
    watcher.set_silenced(false);

    // The same probe feeds report records: the G columns show how many
    // collections the measured interval triggered. The reset-baseline flag
    // forces a collection first, which the baseline then absorbs.
    let timer = Timer::with_collector_probe(probe.clone());

    let session = timer
        .begin("simulated allocation burst", true)
        .expect("cycle counters should be available on this platform");

    probe.record_minor_collection();
    probe.record_minor_collection();
    probe.record_major_collection();

    session
        .close()
        .expect("cycle counters should be available on this platform");

    watcher.stop();
}
