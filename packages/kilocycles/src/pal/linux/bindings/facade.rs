use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

use crate::pal::linux::BuildTargetBindings;
#[cfg(test)]
use crate::pal::linux::MockBindings;
use crate::pal::linux::bindings::Bindings;

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
    fn clock_gettime_ns(&self, clock: libc::clockid_t) -> Result<u64, io::Error> {
        match self {
            Self::Real(bindings) => bindings.clock_gettime_ns(clock),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.clock_gettime_ns(clock),
        }
    }

    fn thread_cpu_clock(&self, thread: libc::pthread_t) -> Result<libc::clockid_t, io::Error> {
        match self {
            Self::Real(bindings) => bindings.thread_cpu_clock(thread),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.thread_cpu_clock(thread),
        }
    }

    fn process_cpu_clock(&self, pid: libc::pid_t) -> Result<libc::clockid_t, io::Error> {
        match self {
            Self::Real(bindings) => bindings.process_cpu_clock(pid),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.process_cpu_clock(pid),
        }
    }

    fn online_processor_count(&self) -> usize {
        match self {
            Self::Real(bindings) => bindings.online_processor_count(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.online_processor_count(),
        }
    }

    fn ticks_per_second(&self) -> u64 {
        match self {
            Self::Real(bindings) => bindings.ticks_per_second(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.ticks_per_second(),
        }
    }

    fn proc_stat(&self) -> Result<String, io::Error> {
        match self {
            Self::Real(bindings) => bindings.proc_stat(),
            #[cfg(test)]
            Self::Mock(bindings) => bindings.proc_stat(),
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
