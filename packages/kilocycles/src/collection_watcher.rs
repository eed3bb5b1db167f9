//! Background watching of collector activity.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::gc::{CollectionDeltas, CollectorProbe};

/// Watches a collector probe in the background and reports collection
/// activity as it happens.
///
/// The watcher polls the probe's collection counts on a dedicated thread and
/// invokes the callback with the per-generation deltas whenever any count
/// has increased since the previous poll. It has a plain lifecycle: spawn it
/// when interested in collector activity, silence it to temporarily ignore
/// activity without losing the poll cadence, stop it (or drop it) to end the
/// watch.
///
/// # Example
///
/// ```
/// use std::sync::mpsc;
/// use std::time::Duration;
///
/// use kilocycles::{CollectionWatcher, NullProbe};
///
/// let (activity_tx, activity_rx) = mpsc::channel();
///
/// let watcher = CollectionWatcher::spawn(
///     NullProbe,
///     Duration::from_millis(10),
///     move |deltas| drop(activity_tx.send(deltas)),
/// );
///
/// // The null probe never observes collections, so nothing arrives.
/// assert!(
///     activity_rx
///         .recv_timeout(Duration::from_millis(50))
///         .is_err()
/// );
///
/// watcher.stop();
/// ```
#[derive(Debug)]
#[must_use = "The watch lasts only until the watcher is dropped"]
pub struct CollectionWatcher {
    stop: Arc<AtomicBool>,
    silenced: Arc<AtomicBool>,

    // `None` only once the thread has been joined.
    thread: Option<JoinHandle<()>>,
}

impl CollectionWatcher {
    /// Starts watching the probe, polling its counts at the given interval.
    ///
    /// The callback runs on the watcher's own thread. A slow callback delays
    /// subsequent polls but never loses activity, as the deltas accumulate
    /// in the probe's counts until the next read.
    pub fn spawn(
        probe: impl CollectorProbe + 'static,
        poll_interval: Duration,
        mut on_collections: impl FnMut(CollectionDeltas) + Send + 'static,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let silenced = Arc::new(AtomicBool::new(false));

        let thread_stop = Arc::clone(&stop);
        let thread_silenced = Arc::clone(&silenced);

        let thread = thread::spawn(move || {
            let mut previous = probe.collection_counts();

            while !thread_stop.load(Ordering::Relaxed) {
                thread::sleep(poll_interval);

                let current = probe.collection_counts();
                let deltas = current.delta_since(&previous);
                previous = current;

                if deltas.any() && !thread_silenced.load(Ordering::Relaxed) {
                    on_collections(deltas);
                }
            }
        });

        Self {
            stop,
            silenced,
            thread: Some(thread),
        }
    }

    /// Suppresses callback invocation without stopping the poll.
    ///
    /// Activity observed while silenced is not queued up. Only increases
    /// that happen after unsilencing reach the callback again.
    pub fn set_silenced(&self, value: bool) {
        self.silenced.store(value, Ordering::Relaxed);
    }

    /// Whether callback invocation is currently suppressed.
    #[must_use]
    pub fn is_silenced(&self) -> bool {
        self.silenced.load(Ordering::Relaxed)
    }

    /// Stops the watch and waits for the watcher thread to exit.
    ///
    /// Returns once the thread has observed the stop signal, which takes at
    /// most one poll interval plus the time of any in-flight callback.
    pub fn stop(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Relaxed);

        if let Some(thread) = self.thread.take() {
            // A callback panic must not propagate out of drop.
            drop(thread.join());
        }
    }
}

impl Drop for CollectionWatcher {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

#[cfg(test)]
#[cfg(not(miri))] // Miri is too slow when running tests that wait on real time.
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::gc::{CollectionCounts, FakeProbe};

    const POLL: Duration = Duration::from_millis(1);

    #[test]
    fn reports_observed_collections() {
        let probe = FakeProbe::new();
        let (deltas_tx, deltas_rx) = mpsc::channel();

        let watcher = CollectionWatcher::spawn(probe.clone(), POLL, move |deltas| {
            drop(deltas_tx.send(deltas));
        });

        // Bump until a report arrives. A single bump could land before the
        // watcher reads its starting counts and would then never show up as
        // a delta.
        let mut gen0 = 0_u64;
        let deltas = loop {
            gen0 = gen0.wrapping_add(1);
            probe.set_counts(CollectionCounts::new(gen0, 0, 0));

            if let Ok(deltas) = deltas_rx.recv_timeout(Duration::from_millis(50)) {
                break deltas;
            }

            assert!(gen0 < 200, "watcher never reported any collection");
        };

        assert!(deltas.gen0() >= 1);
        assert_eq!(deltas.gen1(), 0);
        assert_eq!(deltas.gen2(), 0);

        watcher.stop();
    }

    #[test]
    fn silenced_watcher_swallows_activity() {
        let probe = FakeProbe::new();
        let (deltas_tx, deltas_rx) = mpsc::channel();

        let watcher = CollectionWatcher::spawn(probe.clone(), POLL, move |deltas| {
            drop(deltas_tx.send(deltas));
        });

        watcher.set_silenced(true);
        assert!(watcher.is_silenced());

        probe.set_counts(CollectionCounts::new(5, 1, 0));

        // Many poll intervals pass without any report arriving.
        assert!(
            deltas_rx
                .recv_timeout(Duration::from_millis(100))
                .is_err()
        );

        watcher.stop();
    }

    #[test]
    fn dropping_joins_the_watcher_thread() {
        let probe = FakeProbe::new();

        let watcher = CollectionWatcher::spawn(probe, POLL, |_deltas| {});

        drop(watcher);
    }
}
