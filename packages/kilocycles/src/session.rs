//! Timing sessions that bracket a measured operation.

use std::marker::PhantomData;

use crate::cycles::{CycleSnapshot, subject_cycles};
use crate::error::{Error, Result};
use crate::gc::{CollectionCounts, CollectorProbe, ProbeFacade};
use crate::measurement::Measurement;
use crate::pal::{Platform, PlatformFacade};
use crate::subjects::Subject;

/// An in-flight measurement bracketing an operation of interest.
///
/// Begin a session via [`Timer::begin()`][crate::Timer::begin] immediately
/// before the operation and close it immediately after. Closing settles the
/// wall-clock, cycle and collection deltas into a [`Measurement`] and prints
/// its report record to stdout. Sessions with a blank label still measure
/// but print nothing, which is the idiom for warm-up runs.
///
/// The session is single threaded. Its starting snapshots belong to the
/// counters of the thread that began it, so it cannot be sent to another
/// thread to be closed there.
///
/// # Example
///
/// ```
/// use kilocycles::Timer;
///
/// # fn main() -> Result<(), kilocycles::Error> {
/// let timer = Timer::new();
///
/// let session = timer.begin("reverse strings", false)?;
/// for text in ["alpha", "beta", "gamma"] {
///     let reversed = text.chars().rev().collect::<String>();
///     std::hint::black_box(&reversed);
/// }
/// let measurement = session.close()?;
///
/// assert_eq!(measurement.label(), "reverse strings");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
#[must_use = "Measurements are only recorded when the session is closed"]
pub struct Session {
    platform: PlatformFacade,
    probe: ProbeFacade,
    subject: Subject,
    label: String,
    start_collections: CollectionCounts,
    start_ticks: u64,
    start_cycles: CycleSnapshot,

    _single_threaded: PhantomData<*const ()>,
}

impl Session {
    pub(crate) fn begin(
        platform: PlatformFacade,
        probe: ProbeFacade,
        subject: Subject,
        label: String,
        reset_baseline: bool,
    ) -> Result<Self> {
        if reset_baseline {
            probe.force_collect();
        }

        // The collection baseline is read after any forced collection, so
        // the forced collection itself never counts towards the interval.
        let start_collections = probe.collection_counts();
        let start_ticks = platform.timestamp();

        // The cycle snapshot comes last. Everything the bracket does before
        // it stays outside the measured interval.
        let start_cycles = subject_cycles(&platform, subject)?;

        Ok(Self {
            platform,
            probe,
            subject,
            label,
            start_collections,
            start_ticks,
            start_cycles,
            _single_threaded: PhantomData,
        })
    }

    /// The label the eventual measurement will report under.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The subject whose cycle counter this session brackets.
    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// Ends the measured interval and settles it into a [`Measurement`].
    ///
    /// Prints the measurement's report record to stdout unless the label is
    /// blank.
    ///
    /// # Errors
    ///
    /// Any error of the underlying cycle query for the session's subject, or
    /// [`Error::BackwardsCounter`] if a counter read below its value at
    /// session begin.
    pub fn close(self) -> Result<Measurement> {
        // The cycle snapshot comes first. Everything the bracket does after
        // it stays outside the measured interval.
        let end_cycles = subject_cycles(&self.platform, self.subject)?;
        let end_ticks = self.platform.timestamp();
        let end_collections = self.probe.collection_counts();

        let elapsed_cycles = end_cycles.delta_since(self.start_cycles)?;
        let elapsed_ticks = end_ticks
            .checked_sub(self.start_ticks)
            .ok_or(Error::BackwardsCounter {
                start: self.start_ticks,
                end: end_ticks,
            })?;
        let collections = end_collections.delta_since(&self.start_collections);

        let frequency = self.platform.frequency();

        let measurement = Measurement::new(
            self.label,
            elapsed_ticks,
            frequency,
            elapsed_cycles,
            collections,
        );

        measurement.print_to_stdout();

        Ok(measurement)
    }
}
