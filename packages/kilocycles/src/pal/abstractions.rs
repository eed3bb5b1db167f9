use std::fmt::Debug;

use crate::cycles::CycleSnapshot;
use crate::error::Result;

pub(crate) const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Raw platform identity of a thread subject.
///
/// Carries the bit pattern of a `pthread_t` (Unix) or a thread `HANDLE`
/// (Windows); interpretation is up to the platform implementation. The
/// identity stays valid for as long as the originating thread has not been
/// joined or detached.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct RawThreadHandle(pub(crate) u64);

/// Raw platform identity of a process subject (its process ID).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct RawProcessHandle(pub(crate) u32);

/// Provides cycle accounting and monotonic wall ticks.
///
/// This trait abstracts the platform-specific counter queries, allowing for
/// both real implementations (using system calls) and mock implementations
/// (for testing).
///
/// The unit of a cycle reading is platform specific (processor cycles on
/// Windows, nanoseconds of processor time on Linux) but every implementation
/// guarantees the same shape: cumulative, monotonically non-decreasing for
/// the life of the subject, and proportional to processor effort spent.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Cumulative cycles consumed by the calling thread.
    fn current_thread_cycles(&self) -> Result<CycleSnapshot>;

    /// Cumulative cycles consumed by the identified thread.
    fn thread_cycles(&self, thread: RawThreadHandle) -> Result<CycleSnapshot>;

    /// Cumulative cycles consumed by all threads of the identified process,
    /// including threads that have already exited.
    fn process_cycles(&self, process: RawProcessHandle) -> Result<CycleSnapshot>;

    /// Cumulative cycles consumed by each logical processor's idle thread,
    /// one entry per processor, in processor order.
    fn idle_processor_cycles(&self) -> Result<Vec<CycleSnapshot>>;

    /// Number of logical processors visible to the caller right now.
    fn processor_count(&self) -> usize;

    /// Current reading of the monotonic wall-clock tick counter.
    fn timestamp(&self) -> u64;

    /// Tick rate of [`timestamp()`](Platform::timestamp) in ticks per second.
    ///
    /// Constant for the lifetime of the process and never zero.
    fn frequency(&self) -> u64;
}
