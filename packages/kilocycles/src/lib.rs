#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Micro-benchmark measurement brackets that record wall-clock time,
//! processor cycles and collector activity around repeated operations.
//!
//! The core functionality includes:
//! - [`Timer`] - Begins timing sessions and runs repeat-loop measurements
//! - [`Session`] - A bracketed measurement interval, settled on close
//! - [`Measurement`] - The settled deltas and their printed report record
//! - [`CycleCounter`] - Direct cycle queries for threads, processes and idle
//!   processors
//! - [`CycleTracker`] - Samples one subject's consumption against a fixed
//!   starting snapshot
//! - [`CollectorProbe`] - Injected source of collection counts, with
//!   [`CollectionWatcher`] reporting collector activity in the background
//!
//! This package is not meant for use in production, serving only as a
//! development tool.
//!
//! # Measuring an operation
//!
//! Run the operation once with a blank label to absorb warm-up effects, then
//! again with a real label to print the report:
//!
//! ```
//! use kilocycles::Timer;
//!
//! # fn main() -> Result<(), kilocycles::Error> {
//! let timer = Timer::new();
//!
//! timer.repeat("", false, 10_000, || {
//!     std::hint::black_box((0..100_u64).sum::<u64>());
//! })?;
//!
//! let measurement = timer.repeat("sum of 0..100", false, 10_000, || {
//!     std::hint::black_box((0..100_u64).sum::<u64>());
//! })?;
//!
//! assert!(!measurement.is_silent());
//! # Ok(())
//! # }
//! ```
//!
//! For uneven brackets, [`Timer::begin()`] and [`Session::close()`] expose
//! the two halves separately; [`begin()`] and [`repeat()`] are free-function
//! shorthands over a default-configured timer.
//!
//! # The report record
//!
//! Closing a labeled session prints a two-line record to stdout:
//!
//! ```text
//!    build strings
//!      1,204ms      52,117Kc (G0=  12, G1=   2, G2=   0)
//! ```
//!
//! The first line is the label. The second carries elapsed milliseconds,
//! elapsed kilocycles (thousands of counter units) and the collection count
//! delta of each collector generation, in a fixed column layout that report
//! scrapers can rely on. Blank-label sessions compute their measurement
//! without printing anything.
//!
//! A "cycle" is a platform counter unit: processor cycles as attributed by
//! the kernel on Windows, nanoseconds of processor time on Linux. The unit
//! is consistent across subjects on one platform, so deltas and ratios are
//! meaningful; absolute numbers are not comparable across platforms.
//!
//! # Direct cycle queries
//!
//! ```
//! use kilocycles::{CycleCounter, Subject};
//!
//! # fn main() -> Result<(), kilocycles::Error> {
//! let counter = CycleCounter::new();
//!
//! let tracker = counter.start_tracking(Subject::CurrentThread)?;
//! std::hint::black_box("abcdef".repeat(1000));
//! println!("consumed {} cycle units", tracker.elapsed()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Collector activity
//!
//! Processes without a tracing collector report zero collections for every
//! generation. Embedders of collected runtimes implement [`CollectorProbe`]
//! over the runtime's counters and hand it to
//! [`Timer::with_collector_probe()`]; report records then show how many
//! collections of each generation the measured interval triggered.
//!
//! # Threading
//!
//! A [`Session`] is single threaded and must be closed on the thread that
//! began it. Independent sessions on disjoint subjects may run concurrently,
//! as each reads only its own subject's counters. The [`CollectionWatcher`]
//! owns the one background thread this package ever starts and joins it on
//! drop.
//!
//! # Operating system compatibility
//!
//! Cycle accounting is implemented for Windows and Linux. On other operating
//! systems (and under Miri) the package still compiles and wall-clock ticks
//! degrade to the standard library's monotonic clock, but every cycle query
//! fails with [`Error::CounterUnavailable`].

mod collection_watcher;
mod cycles;
mod error;
mod gc;
mod measurement;
mod pal;
mod session;
mod subjects;
mod timer;

pub use collection_watcher::CollectionWatcher;
pub use cycles::{CycleCounter, CycleSnapshot, CycleTracker};
pub use error::Error;
pub use gc::{CollectionCounts, CollectionDeltas, CollectorProbe, NullProbe};
pub use measurement::Measurement;
pub use session::Session;
pub use subjects::{ProcessSubject, Subject, ThreadSubject};
pub use timer::{Timer, begin, repeat};

#[cfg(test)]
pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - program validity cannot be guaranteed";
