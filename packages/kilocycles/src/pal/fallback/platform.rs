use std::io;
use std::num::NonZeroUsize;
use std::sync::OnceLock;
use std::thread::available_parallelism;
use std::time::Instant;

use crate::cycles::CycleSnapshot;
use crate::error::{Error, Result};
use crate::pal::{NANOS_PER_SEC, Platform, RawProcessHandle, RawThreadHandle};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform::new();

/// The tick epoch is the first moment anything asks for a timestamp; all
/// later timestamps are offsets from it.
static TICK_EPOCH: OnceLock<Instant> = OnceLock::new();

/// Fallback platform for operating systems without cycle accounting support,
/// as well as for Miri, which cannot make real system calls.
///
/// Wall ticks degrade gracefully to the standard library's monotonic clock.
/// Cycle queries fail with [`Error::CounterUnavailable`]: a fabricated zero
/// reading would be indistinguishable from a genuinely idle subject, so the
/// absence of a counter is surfaced as an error instead.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

impl BuildTargetPlatform {
    pub(crate) const fn new() -> Self {
        Self
    }
}

impl Platform for BuildTargetPlatform {
    fn current_thread_cycles(&self) -> Result<CycleSnapshot> {
        Err(no_cycle_accounting())
    }

    fn thread_cycles(&self, _thread: RawThreadHandle) -> Result<CycleSnapshot> {
        Err(no_cycle_accounting())
    }

    fn process_cycles(&self, _process: RawProcessHandle) -> Result<CycleSnapshot> {
        Err(no_cycle_accounting())
    }

    fn idle_processor_cycles(&self) -> Result<Vec<CycleSnapshot>> {
        Err(no_cycle_accounting())
    }

    fn processor_count(&self) -> usize {
        available_parallelism().map_or(1, NonZeroUsize::get)
    }

    fn timestamp(&self) -> u64 {
        let epoch = TICK_EPOCH.get_or_init(Instant::now);

        u64::try_from(epoch.elapsed().as_nanos())
            .expect("process uptimes beyond the u64 nanosecond range indicate an unrealistic scenario")
    }

    fn frequency(&self) -> u64 {
        NANOS_PER_SEC
    }
}

fn no_cycle_accounting() -> Error {
    Error::CounterUnavailable {
        source: io::Error::new(
            io::ErrorKind::Unsupported,
            "cycle accounting is not available on this platform",
        ),
    }
}
