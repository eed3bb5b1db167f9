use std::io;

use crate::cycles::CycleSnapshot;
use crate::error::{Error, Result};
use crate::pal::linux::{Bindings, BindingsFacade};
use crate::pal::{NANOS_PER_SEC, Platform, RawProcessHandle, RawThreadHandle};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(BindingsFacade::real());

/// Linux cycle accounting.
///
/// Cycle readings on Linux are nanoseconds of processor time: thread and
/// process readings come from the POSIX processor-time clocks, idle readings
/// from `/proc/stat` with kernel ticks scaled up to nanoseconds. Wall ticks
/// come from `CLOCK_MONOTONIC` at nanosecond resolution.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    bindings: BindingsFacade,
}

impl BuildTargetPlatform {
    // Only executed in const context.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub(crate) const fn new(bindings: BindingsFacade) -> Self {
        Self { bindings }
    }

    fn read_cpu_clock(&self, clock: libc::clockid_t) -> Result<CycleSnapshot> {
        self.bindings
            .clock_gettime_ns(clock)
            .map(CycleSnapshot::new)
            .map_err(clock_error)
    }
}

impl Platform for BuildTargetPlatform {
    fn current_thread_cycles(&self) -> Result<CycleSnapshot> {
        self.read_cpu_clock(libc::CLOCK_THREAD_CPUTIME_ID)
    }

    fn thread_cycles(&self, thread: RawThreadHandle) -> Result<CycleSnapshot> {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "pthread_t is at most pointer-sized on every supported target"
        )]
        let thread_id = thread.0 as usize as libc::pthread_t;

        let clock = self
            .bindings
            .thread_cpu_clock(thread_id)
            .map_err(clock_error)?;

        self.read_cpu_clock(clock)
    }

    fn process_cycles(&self, process: RawProcessHandle) -> Result<CycleSnapshot> {
        // A process ID beyond pid_t range cannot name a live process.
        let pid = libc::pid_t::try_from(process.0)
            .map_err(|_err| Error::InvalidHandle {
                source: io::Error::from_raw_os_error(libc::ESRCH),
            })?;

        let clock = self
            .bindings
            .process_cpu_clock(pid)
            .map_err(clock_error)?;

        self.read_cpu_clock(clock)
    }

    fn idle_processor_cycles(&self) -> Result<Vec<CycleSnapshot>> {
        let stat = self
            .bindings
            .proc_stat()
            .map_err(|source| Error::CounterUnavailable { source })?;

        let idle_ticks =
            parse_idle_ticks(&stat).map_err(|source| Error::CounterUnavailable { source })?;

        let nanos_per_tick = NANOS_PER_SEC
            .checked_div(self.bindings.ticks_per_second())
            .expect("bindings guarantee a non-zero tick rate");

        Ok(idle_ticks
            .into_iter()
            .map(|ticks| {
                let nanos = ticks
                    .checked_mul(nanos_per_tick)
                    .expect("idle tick counts overflowing u64 nanoseconds indicate an unrealistic scenario");

                CycleSnapshot::new(nanos)
            })
            .collect())
    }

    fn processor_count(&self) -> usize {
        self.bindings.online_processor_count()
    }

    fn timestamp(&self) -> u64 {
        self.bindings
            .clock_gettime_ns(libc::CLOCK_MONOTONIC)
            .expect("CLOCK_MONOTONIC is always available on Linux")
    }

    fn frequency(&self) -> u64 {
        NANOS_PER_SEC
    }
}

/// Maps a processor-time clock failure onto the crate error taxonomy.
///
/// `ESRCH` means the handle no longer names a live thread or process;
/// anything else is a platform refusal.
fn clock_error(source: io::Error) -> Error {
    if source.raw_os_error() == Some(libc::ESRCH) {
        Error::InvalidHandle { source }
    } else {
        Error::CounterUnavailable { source }
    }
}

/// Extracts the idle tick column from the per-processor rows of `/proc/stat`.
///
/// Rows look like `cpu3 100 0 50 9999 ...`. The aggregate `cpu` row is
/// skipped; the fourth value of each `cpuN` row is that processor's
/// cumulative idle tick count.
fn parse_idle_ticks(stat: &str) -> std::result::Result<Vec<u64>, io::Error> {
    let mut idle_ticks = Vec::new();

    for line in stat.lines() {
        let mut fields = line.split_whitespace();

        let Some(label) = fields.next() else {
            continue;
        };

        if !is_processor_label(label) {
            continue;
        }

        // Fields after the label: user, nice, system, idle.
        let idle = fields
            .nth(3)
            .ok_or_else(|| malformed_stat_row(label))?
            .parse::<u64>()
            .map_err(|_err| malformed_stat_row(label))?;

        idle_ticks.push(idle);
    }

    Ok(idle_ticks)
}

/// Whether a `/proc/stat` row label names a single processor (`cpu0`, `cpu1`, ...).
fn is_processor_label(label: &str) -> bool {
    label
        .strip_prefix("cpu")
        .is_some_and(|suffix| !suffix.is_empty() && suffix.bytes().all(|byte| byte.is_ascii_digit()))
}

fn malformed_stat_row(label: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("malformed /proc/stat row '{label}'"),
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::hint::black_box;

    use super::*;
    use crate::pal::linux::MockBindings;

    const SAMPLE_STAT: &str = "\
cpu  400 0 300 20000 100 0 50 0 0 0
cpu0 200 0 150 9999 50 0 25 0 0 0
cpu1 200 0 150 10001 50 0 25 0 0 0
intr 123456 0 0
ctxt 7890
btime 1700000000
";

    #[test]
    fn parses_only_per_processor_rows() {
        let idle_ticks = parse_idle_ticks(SAMPLE_STAT).unwrap();

        assert_eq!(idle_ticks, vec![9999, 10001]);
    }

    #[test]
    fn rejects_truncated_processor_row() {
        let result = parse_idle_ticks("cpu0 200 0\n");

        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_numeric_idle_column() {
        let result = parse_idle_ticks("cpu0 200 0 150 oops 50\n");

        assert!(result.is_err());
    }

    #[test]
    fn processor_label_requires_digits() {
        assert!(is_processor_label("cpu0"));
        assert!(is_processor_label("cpu17"));
        assert!(!is_processor_label("cpu"));
        assert!(!is_processor_label("cpufreq"));
        assert!(!is_processor_label("intr"));
    }

    #[test]
    fn idle_cycles_scale_ticks_to_nanoseconds() {
        let mut bindings = MockBindings::new();
        bindings
            .expect_proc_stat()
            .returning(|| Ok("cpu0 1 2 3 2 0\ncpu1 1 2 3 3 0\n".to_string()));
        bindings.expect_ticks_per_second().return_const(100_u64);

        let platform = BuildTargetPlatform::new(BindingsFacade::from(bindings));

        let snapshots = platform.idle_processor_cycles().unwrap();

        // 100 ticks per second makes each tick 10 million nanoseconds.
        assert_eq!(
            snapshots,
            vec![
                CycleSnapshot::new(20_000_000),
                CycleSnapshot::new(30_000_000)
            ]
        );
    }

    #[test]
    fn stale_thread_maps_to_invalid_handle() {
        let mut bindings = MockBindings::new();
        bindings
            .expect_thread_cpu_clock()
            .returning(|_thread| Err(io::Error::from_raw_os_error(libc::ESRCH)));

        let platform = BuildTargetPlatform::new(BindingsFacade::from(bindings));

        let result = platform.thread_cycles(RawThreadHandle(1));

        assert!(matches!(result, Err(Error::InvalidHandle { .. })));
    }

    #[test]
    fn denied_process_clock_maps_to_counter_unavailable() {
        let mut bindings = MockBindings::new();
        bindings
            .expect_process_cpu_clock()
            .returning(|_pid| Err(io::Error::from_raw_os_error(libc::EPERM)));

        let platform = BuildTargetPlatform::new(BindingsFacade::from(bindings));

        let result = platform.process_cycles(RawProcessHandle(12345));

        assert!(matches!(result, Err(Error::CounterUnavailable { .. })));
    }

    #[test]
    fn process_cycles_reads_the_process_clock() {
        let mut bindings = MockBindings::new();
        bindings
            .expect_process_cpu_clock()
            .returning(|_pid| Ok(42));
        bindings
            .expect_clock_gettime_ns()
            .withf(|clock| *clock == 42)
            .returning(|_clock| Ok(5000));

        let platform = BuildTargetPlatform::new(BindingsFacade::from(bindings));

        let snapshot = platform.process_cycles(RawProcessHandle(12345)).unwrap();

        assert_eq!(snapshot.count(), 5000);
    }

    #[test]
    fn current_thread_cycles_accumulate() {
        let platform = BuildTargetPlatform::new(BindingsFacade::real());

        let first = platform.current_thread_cycles().unwrap();

        // Burn enough processor time for the reading to move.
        let mut accumulator = 0_u64;
        for value in 0..100_000_u64 {
            accumulator = accumulator.wrapping_add(black_box(value));
        }
        black_box(accumulator);

        let second = platform.current_thread_cycles().unwrap();

        assert!(second.count() >= first.count());
    }

    #[test]
    fn timestamp_is_monotonic() {
        let platform = BuildTargetPlatform::new(BindingsFacade::real());

        let first = platform.timestamp();
        let second = platform.timestamp();

        assert!(second >= first);
        assert_eq!(platform.frequency(), NANOS_PER_SEC);
    }
}
