use std::fmt::Debug;
use std::io;

/// Bindings for FFI calls into external libraries (either provided by the
/// operating system or not).
///
/// All PAL FFI calls must go through this trait, enabling them to be mocked.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Bindings: Debug + Send + Sync + 'static {
    /// Current reading of the identified clock, in nanoseconds.
    fn clock_gettime_ns(&self, clock: libc::clockid_t) -> Result<u64, io::Error>;

    /// The processor-time clock of the identified thread,
    /// via `pthread_getcpuclockid()`.
    fn thread_cpu_clock(&self, thread: libc::pthread_t) -> Result<libc::clockid_t, io::Error>;

    /// The processor-time clock of the identified process,
    /// via `clock_getcpuclockid()`.
    fn process_cpu_clock(&self, pid: libc::pid_t) -> Result<libc::clockid_t, io::Error>;

    /// Number of processors currently online.
    fn online_processor_count(&self) -> usize;

    /// Kernel tick rate underlying `/proc` time accounting, in ticks per
    /// second. Never zero.
    fn ticks_per_second(&self) -> u64;

    /// Contents of `/proc/stat`.
    fn proc_stat(&self) -> Result<String, io::Error>;
}
