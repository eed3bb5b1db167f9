//! Cycle snapshots and the queries that produce them.

use crate::error::{Error, Result};
use crate::pal::{Platform, PlatformFacade};
use crate::subjects::{ProcessSubject, Subject, ThreadSubject};

/// A point-in-time reading of a subject's cumulative cycle counter.
///
/// The contained value counts platform cycle units consumed by the subject
/// since an unspecified epoch: processor cycles as charged by the kernel on
/// Windows, nanoseconds of processor time on Linux. The counter never
/// decreases while the subject is alive, so two snapshots of the same
/// subject bound a meaningful interval.
///
/// Snapshots of different subjects are not comparable.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CycleSnapshot(u64);

impl CycleSnapshot {
    pub(crate) fn new(count: u64) -> Self {
        Self(count)
    }

    /// The raw counter value, in platform cycle units.
    #[must_use]
    pub fn count(self) -> u64 {
        self.0
    }

    /// Cycle units elapsed from `earlier` to this snapshot.
    ///
    /// # Errors
    ///
    /// [`Error::BackwardsCounter`] if this snapshot is smaller than
    /// `earlier`, which indicates counter wraparound or a handle that no
    /// longer names the original subject. A backwards interval is a
    /// measurement fault, never a value.
    pub fn delta_since(self, earlier: Self) -> Result<u64> {
        self.0.checked_sub(earlier.0).ok_or(Error::BackwardsCounter {
            start: earlier.0,
            end: self.0,
        })
    }
}

/// Best-effort cycle accounting mediated by the operating system.
///
/// Every query either produces a [`CycleSnapshot`] or fails with a
/// reportable error; a failed query is never folded into a zero reading.
///
/// # Example
///
/// ```
/// use kilocycles::CycleCounter;
///
/// # fn main() -> Result<(), kilocycles::Error> {
/// let counter = CycleCounter::new();
///
/// let before = counter.thread_cycles()?;
/// // ... the work being measured ...
/// let after = counter.thread_cycles()?;
///
/// println!("consumed {} cycle units", after.delta_since(before)?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CycleCounter {
    platform: PlatformFacade,
}

impl CycleCounter {
    /// Creates a counter backed by the operating system's cycle accounting.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::real())
    }

    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self { platform }
    }

    /// Cumulative cycles consumed by the calling thread.
    ///
    /// # Errors
    ///
    /// [`Error::CounterUnavailable`] if the platform has no cycle accounting
    /// or declined the query.
    pub fn thread_cycles(&self) -> Result<CycleSnapshot> {
        self.platform.current_thread_cycles()
    }

    /// Cumulative cycles consumed by the identified thread.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if the subject's thread is gone;
    /// [`Error::CounterUnavailable`] if the platform declined the query.
    pub fn thread_cycles_of(&self, thread: ThreadSubject) -> Result<CycleSnapshot> {
        self.platform.thread_cycles(thread.raw())
    }

    /// Cumulative cycles consumed by all threads of the identified process,
    /// including threads that have already exited.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHandle`] if the subject's process is gone;
    /// [`Error::CounterUnavailable`] if the platform declined the query.
    pub fn process_cycles(&self, process: ProcessSubject) -> Result<CycleSnapshot> {
        self.platform.process_cycles(process.raw())
    }

    /// Cycles spent so far in each logical processor's idle thread, one
    /// snapshot per processor visible at call time, in processor order.
    ///
    /// Idle snapshots describe the whole machine; they have no subject and
    /// cannot be tracked, only queried.
    ///
    /// # Errors
    ///
    /// [`Error::SizeMismatch`] if the platform produces a different number
    /// of entries than the processor count, since a silently truncated
    /// sequence would misattribute idleness;
    /// [`Error::CounterUnavailable`] if the platform declined the query.
    pub fn idle_processor_cycles(&self) -> Result<Vec<CycleSnapshot>> {
        let requested = self.platform.processor_count();
        let snapshots = self.platform.idle_processor_cycles()?;

        if snapshots.len() != requested {
            return Err(Error::SizeMismatch {
                requested,
                returned: snapshots.len(),
            });
        }

        Ok(snapshots)
    }

    /// Starts tracking a subject, capturing its starting snapshot now.
    ///
    /// # Errors
    ///
    /// Any error of the underlying query for the chosen subject.
    pub fn start_tracking(&self, subject: Subject) -> Result<CycleTracker> {
        CycleTracker::start(self.platform.clone(), subject)
    }
}

impl Default for CycleCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads the counter appropriate for a subject.
pub(crate) fn subject_cycles(platform: &PlatformFacade, subject: Subject) -> Result<CycleSnapshot> {
    match subject {
        Subject::CurrentThread => platform.current_thread_cycles(),
        Subject::Thread(thread) => platform.thread_cycles(thread.raw()),
        Subject::Process(process) => platform.process_cycles(process.raw()),
    }
}

/// Samples one subject's cycle consumption relative to a fixed starting
/// snapshot.
///
/// Created by [`CycleCounter::start_tracking()`]. The starting snapshot is
/// captured once; [`elapsed()`](CycleTracker::elapsed) may be called any
/// number of times and each call reports the consumption accumulated since
/// the start.
#[derive(Debug)]
pub struct CycleTracker {
    platform: PlatformFacade,
    subject: Subject,
    start: CycleSnapshot,
}

impl CycleTracker {
    pub(crate) fn start(platform: PlatformFacade, subject: Subject) -> Result<Self> {
        let start = subject_cycles(&platform, subject)?;

        Ok(Self {
            platform,
            subject,
            start,
        })
    }

    /// The subject this tracker measures.
    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    /// The starting snapshot this tracker measures from.
    #[must_use]
    pub fn start_snapshot(&self) -> CycleSnapshot {
        self.start
    }

    /// Cycle units the subject has consumed since tracking started.
    ///
    /// # Errors
    ///
    /// Any error of the underlying query, or [`Error::BackwardsCounter`] if
    /// the counter read below the starting snapshot.
    pub fn elapsed(&self) -> Result<u64> {
        subject_cycles(&self.platform, self.subject)?.delta_since(self.start)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use mockall::Sequence;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::pal::MockPlatform;

    assert_impl_all!(CycleSnapshot: Send, Sync, Debug);
    assert_impl_all!(CycleCounter: Send, Sync, Debug);
    assert_impl_all!(CycleTracker: Send, Sync, Debug);

    #[test]
    fn delta_between_snapshots_is_difference() {
        let earlier = CycleSnapshot::new(1000);
        let later = CycleSnapshot::new(4500);

        assert_eq!(later.delta_since(earlier).unwrap(), 3500);
    }

    #[test]
    fn delta_of_equal_snapshots_is_zero() {
        let snapshot = CycleSnapshot::new(1000);

        assert_eq!(snapshot.delta_since(snapshot).unwrap(), 0);
    }

    #[test]
    fn backwards_delta_is_a_fault() {
        let earlier = CycleSnapshot::new(4500);
        let later = CycleSnapshot::new(1000);

        let result = later.delta_since(earlier);

        assert!(matches!(
            result,
            Err(Error::BackwardsCounter {
                start: 4500,
                end: 1000
            })
        ));
    }

    #[test]
    fn idle_query_with_matching_count_passes_through() {
        let mut platform = MockPlatform::new();
        platform.expect_processor_count().return_const(2_usize);
        platform
            .expect_idle_processor_cycles()
            .returning(|| Ok(vec![CycleSnapshot::new(10), CycleSnapshot::new(20)]));

        let counter = CycleCounter::with_platform(PlatformFacade::from_mock(platform));

        let snapshots = counter.idle_processor_cycles().unwrap();

        assert_eq!(
            snapshots,
            vec![CycleSnapshot::new(10), CycleSnapshot::new(20)]
        );
    }

    #[test]
    fn idle_query_with_fewer_entries_is_size_mismatch() {
        let mut platform = MockPlatform::new();
        platform.expect_processor_count().return_const(4_usize);
        platform
            .expect_idle_processor_cycles()
            .returning(|| Ok(vec![CycleSnapshot::new(10), CycleSnapshot::new(20)]));

        let counter = CycleCounter::with_platform(PlatformFacade::from_mock(platform));

        let result = counter.idle_processor_cycles();

        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                requested: 4,
                returned: 2
            })
        ));
    }

    #[test]
    fn tracker_reports_consumption_since_start() {
        let mut sequence = Sequence::new();
        let mut platform = MockPlatform::new();
        platform
            .expect_current_thread_cycles()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(CycleSnapshot::new(100)));
        platform
            .expect_current_thread_cycles()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(CycleSnapshot::new(400)));

        let counter = CycleCounter::with_platform(PlatformFacade::from_mock(platform));

        let tracker = counter.start_tracking(Subject::CurrentThread).unwrap();

        assert_eq!(tracker.start_snapshot(), CycleSnapshot::new(100));
        assert_eq!(tracker.elapsed().unwrap(), 300);
    }

    #[test]
    fn tracker_surfaces_backwards_counter() {
        let mut sequence = Sequence::new();
        let mut platform = MockPlatform::new();
        platform
            .expect_current_thread_cycles()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(CycleSnapshot::new(400)));
        platform
            .expect_current_thread_cycles()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(CycleSnapshot::new(100)));

        let counter = CycleCounter::with_platform(PlatformFacade::from_mock(platform));

        let tracker = counter.start_tracking(Subject::CurrentThread).unwrap();

        let result = tracker.elapsed();

        assert!(matches!(
            result,
            Err(Error::BackwardsCounter {
                start: 400,
                end: 100
            })
        ));
    }

    #[test]
    fn process_subject_query_uses_process_identity() {
        let mut platform = MockPlatform::new();
        platform
            .expect_process_cycles()
            .withf(|process| process.0 == 1234)
            .returning(|_process| Ok(CycleSnapshot::new(5000)));

        let counter = CycleCounter::with_platform(PlatformFacade::from_mock(platform));

        let snapshot = counter
            .process_cycles(ProcessSubject::from_pid(1234))
            .unwrap();

        assert_eq!(snapshot.count(), 5000);
    }
}
