//! Collector activity probes.
//!
//! The harness never reads collector state from ambient globals. A probe is
//! injected where collection counts are needed, so tests can use a synthetic
//! source and embedders of collected runtimes can surface real counts.

use std::fmt::Debug;
use std::sync::Arc;
#[cfg(test)]
use std::sync::Mutex;

/// Supplies generation collection counts from whatever garbage collector
/// accompanies the process.
///
/// A plain Rust process has no tracing collector, in which case
/// [`NullProbe`] applies and every generation legitimately reads zero. When a
/// collected runtime is embedded in the process, implement this trait against
/// its control interface and hand it to
/// [`Timer::with_collector_probe()`][crate::Timer::with_collector_probe].
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// use kilocycles::{CollectionCounts, CollectorProbe};
///
/// /// Counts collections of an imaginary embedded runtime.
/// #[derive(Debug, Default)]
/// struct RuntimeProbe {
///     gen0_collections: AtomicU64,
/// }
///
/// impl CollectorProbe for RuntimeProbe {
///     fn collection_counts(&self) -> CollectionCounts {
///         CollectionCounts::new(self.gen0_collections.load(Ordering::Relaxed), 0, 0)
///     }
///
///     fn force_collect(&self) {
///         // A real implementation would drive the runtime's collector here.
///         self.gen0_collections.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait CollectorProbe: Debug + Send + Sync {
    /// Collections performed so far against each generation, cumulative since
    /// runtime start.
    fn collection_counts(&self) -> CollectionCounts;

    /// Forces a full collection cycle: collect, wait for pending finalization
    /// work, collect again.
    ///
    /// Used when a timing session begins with a reset baseline, so garbage
    /// accumulated by earlier runs cannot land in the session's deltas. The
    /// call is synchronous; it returns only once the collection work is
    /// complete. An implementation that cannot complete the cycle should
    /// panic, as measurements taken over an unknown baseline are worthless.
    fn force_collect(&self);
}

/// Generation collection counts at a point in time.
///
/// Generation 0 is the youngest tier. Counts only ever grow while the
/// collector is running.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CollectionCounts {
    gen0: u64,
    gen1: u64,
    gen2: u64,
}

impl CollectionCounts {
    /// Creates a reading from per-generation cumulative counts.
    #[must_use]
    pub const fn new(gen0: u64, gen1: u64, gen2: u64) -> Self {
        Self { gen0, gen1, gen2 }
    }

    /// Generation 0 collections so far.
    #[must_use]
    pub fn gen0(&self) -> u64 {
        self.gen0
    }

    /// Generation 1 collections so far.
    #[must_use]
    pub fn gen1(&self) -> u64 {
        self.gen1
    }

    /// Generation 2 collections so far.
    #[must_use]
    pub fn gen2(&self) -> u64 {
        self.gen2
    }

    /// Per-generation change from `earlier` to this reading.
    ///
    /// Deltas are signed. A probe whose counts move backwards produces
    /// negative deltas, which reports render as-is.
    #[must_use]
    pub fn delta_since(&self, earlier: &Self) -> CollectionDeltas {
        CollectionDeltas {
            gen0: signed_delta(earlier.gen0, self.gen0),
            gen1: signed_delta(earlier.gen1, self.gen1),
            gen2: signed_delta(earlier.gen2, self.gen2),
        }
    }
}

/// Widens both counts so the subtraction below cannot overflow.
fn signed_delta(earlier: u64, current: u64) -> i64 {
    let earlier = i64::try_from(earlier)
        .expect("collection counts beyond i64::MAX indicate an unrealistic scenario");
    let current = i64::try_from(current)
        .expect("collection counts beyond i64::MAX indicate an unrealistic scenario");

    current
        .checked_sub(earlier)
        .expect("difference of two non-negative i64 values always fits in i64")
}

/// Per-generation collection count change over a measured interval.
///
/// Produced by [`CollectionCounts::delta_since()`] and carried in every
/// [`Measurement`][crate::Measurement].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct CollectionDeltas {
    gen0: i64,
    gen1: i64,
    gen2: i64,
}

impl CollectionDeltas {
    /// Generation 0 collections during the interval.
    #[must_use]
    pub fn gen0(&self) -> i64 {
        self.gen0
    }

    /// Generation 1 collections during the interval.
    #[must_use]
    pub fn gen1(&self) -> i64 {
        self.gen1
    }

    /// Generation 2 collections during the interval.
    #[must_use]
    pub fn gen2(&self) -> i64 {
        self.gen2
    }

    /// Whether any generation was collected during the interval.
    #[must_use]
    pub fn any(&self) -> bool {
        self.gen0 != 0 || self.gen1 != 0 || self.gen2 != 0
    }
}

/// Probe for processes without a tracing collector.
///
/// Every generation reads zero and forcing a collection is a no-op. This is
/// the default probe of [`Timer::new()`][crate::Timer::new].
#[derive(Clone, Copy, Debug, Default)]
#[expect(clippy::exhaustive_structs, reason = "intentionally an empty struct")]
pub struct NullProbe;

impl CollectorProbe for NullProbe {
    fn collection_counts(&self) -> CollectionCounts {
        CollectionCounts::default()
    }

    fn force_collect(&self) {}
}

/// Hides the null/custom probe choice behind a single concrete type.
#[derive(Clone, Debug)]
pub(crate) enum ProbeFacade {
    Null(&'static NullProbe),
    Custom(Arc<dyn CollectorProbe>),
}

impl ProbeFacade {
    pub(crate) const fn null() -> Self {
        Self::Null(&NullProbe)
    }

    pub(crate) fn custom(probe: Arc<dyn CollectorProbe>) -> Self {
        Self::Custom(probe)
    }
}

impl CollectorProbe for ProbeFacade {
    fn collection_counts(&self) -> CollectionCounts {
        match self {
            Self::Null(probe) => probe.collection_counts(),
            Self::Custom(probe) => probe.collection_counts(),
        }
    }

    fn force_collect(&self) {
        match self {
            Self::Null(probe) => probe.force_collect(),
            Self::Custom(probe) => probe.force_collect(),
        }
    }
}

/// A probe with externally adjustable counts, for tests that need to steer
/// collector activity without a real collector.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeProbe {
    state: Arc<Mutex<FakeProbeState>>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct FakeProbeState {
    counts: CollectionCounts,
    collect_effect: CollectionCounts,
    collect_calls: usize,
}

#[cfg(test)]
impl FakeProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Sets the counts that subsequent reads will observe.
    pub(crate) fn set_counts(&self, counts: CollectionCounts) {
        self.state.lock().expect(crate::ERR_POISONED_LOCK).counts = counts;
    }

    /// Sets counts that each forced collection adds on top of the current
    /// ones, mimicking a collector whose forced cycle itself registers as
    /// collections.
    pub(crate) fn set_collect_effect(&self, effect: CollectionCounts) {
        self.state.lock().expect(crate::ERR_POISONED_LOCK).collect_effect = effect;
    }

    /// How many times a forced collection has been requested.
    pub(crate) fn collect_calls(&self) -> usize {
        self.state.lock().expect(crate::ERR_POISONED_LOCK).collect_calls
    }
}

#[cfg(test)]
impl CollectorProbe for FakeProbe {
    fn collection_counts(&self) -> CollectionCounts {
        self.state.lock().expect(crate::ERR_POISONED_LOCK).counts
    }

    fn force_collect(&self) {
        let mut state = self.state.lock().expect(crate::ERR_POISONED_LOCK);

        state.collect_calls = state.collect_calls.saturating_add(1);
        state.counts = CollectionCounts::new(
            state.counts.gen0.saturating_add(state.collect_effect.gen0),
            state.counts.gen1.saturating_add(state.collect_effect.gen1),
            state.counts.gen2.saturating_add(state.collect_effect.gen2),
        );
    }
}
