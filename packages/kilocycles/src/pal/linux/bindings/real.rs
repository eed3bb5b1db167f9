use std::fs;
use std::io;

use crate::pal::NANOS_PER_SEC;
use crate::pal::linux::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock bindings.
/// Even then, whenever possible, unit tests should use real bindings for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

impl Bindings for BuildTargetBindings {
    fn clock_gettime_ns(&self, clock: libc::clockid_t) -> Result<u64, io::Error> {
        let mut time = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        // SAFETY: No safety requirements beyond passing a pointer to a live timespec.
        let result = unsafe { libc::clock_gettime(clock, &raw mut time) };

        if result != 0 {
            return Err(io::Error::last_os_error());
        }

        let seconds = u64::try_from(time.tv_sec)
            .map_err(|_err| io::Error::other("clock reported a negative time"))?;
        let nanos = u64::try_from(time.tv_nsec)
            .map_err(|_err| io::Error::other("clock reported a negative time"))?;

        seconds
            .checked_mul(NANOS_PER_SEC)
            .and_then(|seconds_as_nanos| seconds_as_nanos.checked_add(nanos))
            .ok_or_else(|| io::Error::other("clock reading overflows the u64 nanosecond range"))
    }

    fn thread_cpu_clock(&self, thread: libc::pthread_t) -> Result<libc::clockid_t, io::Error> {
        let mut clock: libc::clockid_t = 0;

        // SAFETY: The thread ID must belong to a thread that has not been joined
        // or detached; subject construction ties it to a live join handle.
        let result = unsafe { libc::pthread_getcpuclockid(thread, &raw mut clock) };

        if result == 0 {
            Ok(clock)
        } else {
            // This family of calls returns the error code directly instead of via errno.
            Err(io::Error::from_raw_os_error(result))
        }
    }

    fn process_cpu_clock(&self, pid: libc::pid_t) -> Result<libc::clockid_t, io::Error> {
        let mut clock: libc::clockid_t = 0;

        // SAFETY: No safety requirements beyond passing a pointer to a live clockid_t.
        let result = unsafe { libc::clock_getcpuclockid(pid, &raw mut clock) };

        if result == 0 {
            Ok(clock)
        } else {
            // This family of calls returns the error code directly instead of via errno.
            Err(io::Error::from_raw_os_error(result))
        }
    }

    fn online_processor_count(&self) -> usize {
        // SAFETY: No safety requirements.
        let count = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };

        // Zero or negative answers mean the kernel could not say, in which
        // case we proceed as if there were one processor.
        usize::try_from(count).unwrap_or(1).max(1)
    }

    fn ticks_per_second(&self) -> u64 {
        // SAFETY: No safety requirements.
        let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };

        // USER_HZ has been 100 on every mainstream configuration for decades;
        // used only if the kernel gives no answer.
        match u64::try_from(ticks) {
            Ok(ticks) if ticks > 0 => ticks,
            _ => 100,
        }
    }

    fn proc_stat(&self) -> Result<String, io::Error> {
        fs::read_to_string("/proc/stat")
    }
}
