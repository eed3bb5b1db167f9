use std::fmt::Debug;

use windows::Win32::Foundation::HANDLE;
use windows::core::Result;

/// Bindings for FFI calls into external libraries (either provided by the
/// operating system or not).
///
/// All PAL FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    /// Cycles charged by the kernel to the identified thread,
    /// via `QueryThreadCycleTime()`.
    fn query_thread_cycle_time(&self, thread: HANDLE) -> Result<u64>;

    /// Cycles charged by the kernel to the identified process across all of
    /// its threads, via `QueryProcessCycleTime()`.
    fn query_process_cycle_time(&self, process: HANDLE) -> Result<u64>;

    /// Fills `cycles` with per-processor idle thread cycle counts, returning
    /// the number of bytes the operating system wrote.
    fn query_idle_processor_cycle_time(&self, cycles: &mut [u64]) -> Result<usize>;

    /// Pseudo handle of the calling thread. Needs no access check and
    /// never goes stale.
    fn get_current_thread(&self) -> HANDLE;

    /// Opens the identified process with the access rights required for
    /// cycle queries. The returned handle must be passed to
    /// [`close_handle()`](Bindings::close_handle) after use.
    fn open_process_for_query(&self, process_id: u32) -> Result<HANDLE>;

    /// Closes a handle previously opened via
    /// [`open_process_for_query()`](Bindings::open_process_for_query).
    fn close_handle(&self, handle: HANDLE) -> Result<()>;

    /// Current reading of the performance counter.
    fn query_performance_counter(&self) -> i64;

    /// Tick rate of the performance counter. Fixed at boot.
    fn query_performance_frequency(&self) -> i64;

    /// Number of logical processors in the current processor group.
    fn number_of_processors(&self) -> usize;
}
