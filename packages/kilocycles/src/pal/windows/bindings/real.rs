use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Performance::{QueryPerformanceCounter, QueryPerformanceFrequency};
use windows::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};
use windows::Win32::System::Threading::{
    GetCurrentThread, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION,
    QueryIdleProcessorCycleTime, QueryProcessCycleTime, QueryThreadCycleTime,
};
use windows::core::Result;

use crate::pal::windows::Bindings;

/// FFI bindings that target the real operating system that the build is targeting.
///
/// You would only use different bindings in PAL unit tests that need to use mock bindings.
/// Even then, whenever possible, unit tests should use real bindings for maximum realism.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetBindings;

impl Bindings for BuildTargetBindings {
    fn query_thread_cycle_time(&self, thread: HANDLE) -> Result<u64> {
        let mut cycles = 0_u64;

        // SAFETY: The cycle pointer refers to a live local for the duration of the call.
        unsafe { QueryThreadCycleTime(thread, &raw mut cycles) }?;

        Ok(cycles)
    }

    fn query_process_cycle_time(&self, process: HANDLE) -> Result<u64> {
        let mut cycles = 0_u64;

        // SAFETY: The cycle pointer refers to a live local for the duration of the call.
        unsafe { QueryProcessCycleTime(process, &raw mut cycles) }?;

        Ok(cycles)
    }

    fn query_idle_processor_cycle_time(&self, cycles: &mut [u64]) -> Result<usize> {
        let mut byte_count = u32::try_from(size_of_val(cycles))
            .expect("idle cycle buffers are far below u32::MAX bytes");

        // SAFETY: The pointer and byte count describe a live, correctly sized buffer.
        unsafe { QueryIdleProcessorCycleTime(&raw mut byte_count, Some(cycles.as_mut_ptr())) }?;

        Ok(usize::try_from(byte_count).expect("u32 always fits in usize on supported targets"))
    }

    fn get_current_thread(&self) -> HANDLE {
        // SAFETY: No safety requirements.
        unsafe { GetCurrentThread() }
    }

    fn open_process_for_query(&self, process_id: u32) -> Result<HANDLE> {
        // SAFETY: No safety requirements beyond passing valid arguments.
        unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, process_id) }
    }

    fn close_handle(&self, handle: HANDLE) -> Result<()> {
        // SAFETY: The caller guarantees the handle is open and owned by us.
        unsafe { CloseHandle(handle) }
    }

    fn query_performance_counter(&self) -> i64 {
        let mut ticks = 0_i64;

        // SAFETY: The tick pointer refers to a live local for the duration of the call.
        unsafe { QueryPerformanceCounter(&raw mut ticks) }
            .expect("the performance counter is always available on supported Windows versions");

        ticks
    }

    fn query_performance_frequency(&self) -> i64 {
        let mut frequency = 0_i64;

        // SAFETY: The frequency pointer refers to a live local for the duration of the call.
        unsafe { QueryPerformanceFrequency(&raw mut frequency) }
            .expect("the performance counter is always available on supported Windows versions");

        frequency
    }

    fn number_of_processors(&self) -> usize {
        let mut info = SYSTEM_INFO::default();

        // SAFETY: The info pointer refers to a live local for the duration of the call.
        unsafe { GetSystemInfo(&raw mut info) };

        usize::try_from(info.dwNumberOfProcessors)
            .expect("u32 always fits in usize on supported targets")
    }
}
