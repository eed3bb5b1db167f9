use std::fmt::Debug;
#[cfg(test)]
use std::sync::Arc;

use windows::Win32::Foundation::HANDLE;
use windows::core::Result;

use crate::pal::windows::BuildTargetBindings;
#[cfg(test)]
use crate::pal::windows::MockBindings;
use crate::pal::windows::bindings::Bindings;

#[derive(Clone)]
pub(crate) enum BindingsFacade {
    Real(&'static BuildTargetBindings),

    #[cfg(test)]
    Mock(Arc<MockBindings>),
}

impl BindingsFacade {
    pub(crate) const fn real() -> Self {
        Self::Real(&BuildTargetBindings)
    }
}

impl Bindings for BindingsFacade {
    fn query_thread_cycle_time(&self, thread: HANDLE) -> Result<u64> {
        match self {
            Self::Real(bindings) => bindings.query_thread_cycle_time(thread),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.query_thread_cycle_time(thread),
        }
    }

    fn query_process_cycle_time(&self, process: HANDLE) -> Result<u64> {
        match self {
            Self::Real(bindings) => bindings.query_process_cycle_time(process),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.query_process_cycle_time(process),
        }
    }

    fn query_idle_processor_cycle_time(&self, cycles: &mut [u64]) -> Result<usize> {
        match self {
            Self::Real(bindings) => bindings.query_idle_processor_cycle_time(cycles),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.query_idle_processor_cycle_time(cycles),
        }
    }

    fn get_current_thread(&self) -> HANDLE {
        match self {
            Self::Real(bindings) => bindings.get_current_thread(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.get_current_thread(),
        }
    }

    fn open_process_for_query(&self, process_id: u32) -> Result<HANDLE> {
        match self {
            Self::Real(bindings) => bindings.open_process_for_query(process_id),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.open_process_for_query(process_id),
        }
    }

    fn close_handle(&self, handle: HANDLE) -> Result<()> {
        match self {
            Self::Real(bindings) => bindings.close_handle(handle),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.close_handle(handle),
        }
    }

    fn query_performance_counter(&self) -> i64 {
        match self {
            Self::Real(bindings) => bindings.query_performance_counter(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.query_performance_counter(),
        }
    }

    fn query_performance_frequency(&self) -> i64 {
        match self {
            Self::Real(bindings) => bindings.query_performance_frequency(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.query_performance_frequency(),
        }
    }

    fn number_of_processors(&self) -> usize {
        match self {
            Self::Real(bindings) => bindings.number_of_processors(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.number_of_processors(),
        }
    }
}

impl From<&'static BuildTargetBindings> for BindingsFacade {
    fn from(bindings: &'static BuildTargetBindings) -> Self {
        Self::Real(bindings)
    }
}

#[cfg(test)]
impl From<MockBindings> for BindingsFacade {
    fn from(bindings: MockBindings) -> Self {
        Self::Mock(Arc::new(bindings))
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for BindingsFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(bindings) => bindings.fmt(f),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.fmt(f),
        }
    }
}
