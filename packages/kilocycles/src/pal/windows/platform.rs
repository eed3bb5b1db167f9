use std::ffi::c_void;
use std::io;

use windows::Win32::Foundation::{ERROR_INVALID_HANDLE, ERROR_INVALID_PARAMETER, HANDLE};

use crate::cycles::CycleSnapshot;
use crate::error::{Error, Result};
use crate::pal::windows::{Bindings, BindingsFacade};
use crate::pal::{Platform, RawProcessHandle, RawThreadHandle};

/// Singleton instance of `BuildTargetPlatform`, used by public API types
/// to hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(BindingsFacade::real());

/// Windows cycle accounting.
///
/// Cycle readings are processor cycles as charged by the kernel scheduler
/// (the `QueryThreadCycleTime()` family), which keep counting at full rate
/// regardless of processor frequency scaling. Wall ticks come from the
/// performance counter.
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
}

impl Platform for BuildTargetPlatform {
    fn current_thread_cycles(&self) -> Result<CycleSnapshot> {
        // The calling thread queries itself via the pseudo handle, which
        // needs no access check and cannot go stale.
        let thread = self.bindings.get_current_thread();

        self.bindings
            .query_thread_cycle_time(thread)
            .map(CycleSnapshot::new)
            .map_err(counter_error)
    }

    fn thread_cycles(&self, thread: RawThreadHandle) -> Result<CycleSnapshot> {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "thread handles are pointer-sized on every supported target"
        )]
        let handle = HANDLE(thread.0 as usize as *mut c_void);

        self.bindings
            .query_thread_cycle_time(handle)
            .map(CycleSnapshot::new)
            .map_err(counter_error)
    }

    fn process_cycles(&self, process: RawProcessHandle) -> Result<CycleSnapshot> {
        let handle = self
            .bindings
            .open_process_for_query(process.0)
            .map_err(counter_error)?;

        let cycles = self.bindings.query_process_cycle_time(handle);

        // Close before inspecting the query result so the handle cannot
        // leak on the error path.
        let closed = self.bindings.close_handle(handle);

        let cycles = cycles.map_err(counter_error)?;
        closed.map_err(counter_error)?;

        Ok(CycleSnapshot::new(cycles))
    }

    fn idle_processor_cycles(&self) -> Result<Vec<CycleSnapshot>> {
        let requested = self.bindings.number_of_processors();
        let mut cycles = vec![0_u64; requested];

        let written_bytes = self
            .bindings
            .query_idle_processor_cycle_time(&mut cycles)
            .map_err(counter_error)?;

        let written_entries = written_bytes
            .checked_div(size_of::<u64>())
            .expect("size_of::<u64>() is a non-zero constant");

        if written_entries != requested {
            return Err(Error::SizeMismatch {
                requested,
                returned: written_entries,
            });
        }

        Ok(cycles.into_iter().map(CycleSnapshot::new).collect())
    }

    fn processor_count(&self) -> usize {
        self.bindings.number_of_processors()
    }

    fn timestamp(&self) -> u64 {
        u64::try_from(self.bindings.query_performance_counter())
            .expect("the performance counter is non-negative by contract")
    }

    fn frequency(&self) -> u64 {
        u64::try_from(self.bindings.query_performance_frequency())
            .expect("the performance counter frequency is positive by contract")
    }
}

/// Maps a cycle query failure onto the crate error taxonomy.
///
/// Invalid handle and invalid parameter codes mean the handle no longer
/// names a live thread or process; anything else is a platform refusal.
fn counter_error(source: windows::core::Error) -> Error {
    let code = source.code();
    let source = io::Error::from(source);

    if code == ERROR_INVALID_HANDLE.to_hresult() || code == ERROR_INVALID_PARAMETER.to_hresult() {
        Error::InvalidHandle { source }
    } else {
        Error::CounterUnavailable { source }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use mockall::Sequence;

    use super::*;
    use crate::pal::windows::MockBindings;

    #[test]
    fn invalid_handle_code_maps_to_invalid_handle() {
        let mut bindings = MockBindings::new();
        bindings
            .expect_query_thread_cycle_time()
            .returning(|_thread| Err(windows::core::Error::from(ERROR_INVALID_HANDLE.to_hresult())));

        let platform = BuildTargetPlatform::new(BindingsFacade::from(bindings));

        let result = platform.thread_cycles(RawThreadHandle(0x1234));

        assert!(matches!(result, Err(Error::InvalidHandle { .. })));
    }

    #[test]
    fn short_idle_answer_is_size_mismatch() {
        let mut bindings = MockBindings::new();
        bindings.expect_number_of_processors().return_const(4_usize);
        bindings
            .expect_query_idle_processor_cycle_time()
            .returning(|_cycles| Ok(16)); // Two entries of the four requested.

        let platform = BuildTargetPlatform::new(BindingsFacade::from(bindings));

        let result = platform.idle_processor_cycles();

        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                requested: 4,
                returned: 2
            })
        ));
    }

    #[test]
    fn full_idle_answer_returns_all_entries() {
        let mut bindings = MockBindings::new();
        bindings.expect_number_of_processors().return_const(2_usize);
        bindings
            .expect_query_idle_processor_cycle_time()
            .returning(|cycles| {
                cycles.fill(900);
                Ok(size_of_val(cycles))
            });

        let platform = BuildTargetPlatform::new(BindingsFacade::from(bindings));

        let snapshots = platform.idle_processor_cycles().unwrap();

        assert_eq!(
            snapshots,
            vec![CycleSnapshot::new(900), CycleSnapshot::new(900)]
        );
    }

    #[test]
    fn process_handle_is_closed_even_when_query_fails() {
        let mut sequence = Sequence::new();

        let mut bindings = MockBindings::new();
        bindings
            .expect_open_process_for_query()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_process_id| Ok(HANDLE::default()));
        bindings
            .expect_query_process_cycle_time()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_process| {
                Err(windows::core::Error::from(ERROR_INVALID_HANDLE.to_hresult()))
            });
        bindings
            .expect_close_handle()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_handle| Ok(()));

        let platform = BuildTargetPlatform::new(BindingsFacade::from(bindings));

        let result = platform.process_cycles(RawProcessHandle(4242));

        assert!(matches!(result, Err(Error::InvalidHandle { .. })));
    }
}
