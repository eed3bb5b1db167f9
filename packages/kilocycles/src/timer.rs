//! The measurement entry point that begins sessions and runs repeat loops.

use std::sync::Arc;

use crate::error::Result;
use crate::gc::{CollectorProbe, ProbeFacade};
use crate::measurement::Measurement;
use crate::pal::PlatformFacade;
use crate::session::Session;
use crate::subjects::Subject;

/// Begins timing sessions and runs repeat-loop measurements.
///
/// The timer carries the platform hookup and the collector probe; every
/// session begun from the same timer shares both. The default probe reports
/// zero collections for every generation, which is the correct reading for a
/// process without a tracing collector. Embedders of collected runtimes
/// supply their own probe via [`with_collector_probe()`][Timer::with_collector_probe].
///
/// # Example
///
/// ```
/// use kilocycles::Timer;
///
/// # fn main() -> Result<(), kilocycles::Error> {
/// let timer = Timer::new();
///
/// // A blank label measures without reporting, absorbing warm-up effects.
/// timer.repeat("", false, 1000, || {
///     std::hint::black_box("hello".chars().rev().count());
/// })?;
///
/// let measurement = timer.repeat("reverse count", false, 1000, || {
///     std::hint::black_box("hello".chars().rev().count());
/// })?;
///
/// assert_eq!(measurement.label(), "reverse count");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Timer {
    platform: PlatformFacade,
    probe: ProbeFacade,
}

impl Timer {
    /// Creates a timer backed by the operating system's counters, with no
    /// collector probe.
    #[must_use]
    pub fn new() -> Self {
        Self {
            platform: PlatformFacade::real(),
            probe: ProbeFacade::null(),
        }
    }

    /// Creates a timer whose sessions read collection counts from the given
    /// probe.
    ///
    /// The probe is consulted once at session begin and once at close, and
    /// its forced collection implements the reset-baseline option of
    /// [`begin()`][Timer::begin].
    #[must_use]
    pub fn with_collector_probe(probe: impl CollectorProbe + 'static) -> Self {
        Self {
            platform: PlatformFacade::real(),
            probe: ProbeFacade::custom(Arc::new(probe)),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_parts(platform: PlatformFacade, probe: ProbeFacade) -> Self {
        Self { platform, probe }
    }

    /// Begins a session measuring the calling thread.
    ///
    /// With `reset_baseline` set, the collector probe is first asked to force
    /// a full collection, so the interval starts from a settled heap instead
    /// of inheriting garbage from earlier runs. The forced collection runs at
    /// most once per call, before any snapshot is taken.
    ///
    /// # Errors
    ///
    /// Any error of the underlying cycle query.
    pub fn begin(&self, label: impl Into<String>, reset_baseline: bool) -> Result<Session> {
        self.begin_subject(label, reset_baseline, Subject::CurrentThread)
    }

    /// Begins a session measuring an explicitly chosen subject.
    ///
    /// # Errors
    ///
    /// Any error of the underlying cycle query for the chosen subject.
    pub fn begin_subject(
        &self,
        label: impl Into<String>,
        reset_baseline: bool,
        subject: Subject,
    ) -> Result<Session> {
        Session::begin(
            self.platform.clone(),
            self.probe.clone(),
            subject,
            label.into(),
            reset_baseline,
        )
    }

    /// Measures `op` invoked exactly `iterations` times within one session.
    ///
    /// Iterations run sequentially on the calling thread. Zero iterations is
    /// allowed and measures the pure bracketing overhead.
    ///
    /// # Errors
    ///
    /// Any error of the underlying cycle queries at session begin or close.
    pub fn repeat(
        &self,
        label: impl Into<String>,
        reset_baseline: bool,
        iterations: u64,
        mut op: impl FnMut(),
    ) -> Result<Measurement> {
        let session = self.begin(label, reset_baseline)?;

        for _ in 0..iterations {
            op();
        }

        session.close()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Begins a session on a default-configured [`Timer`].
///
/// Convenient for one-off measurements; construct a [`Timer`] when sessions
/// should share a collector probe.
///
/// # Errors
///
/// Any error of the underlying cycle query.
pub fn begin(label: impl Into<String>, reset_baseline: bool) -> Result<Session> {
    Timer::new().begin(label, reset_baseline)
}

/// Runs a repeat-loop measurement on a default-configured [`Timer`].
///
/// # Errors
///
/// Any error of the underlying cycle queries at session begin or close.
pub fn repeat(
    label: impl Into<String>,
    reset_baseline: bool,
    iterations: u64,
    op: impl FnMut(),
) -> Result<Measurement> {
    Timer::new().repeat(label, reset_baseline, iterations, op)
}
