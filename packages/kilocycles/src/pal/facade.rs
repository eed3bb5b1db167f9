use std::fmt::Debug;
#[cfg(test)]
use std::sync::Arc;

use crate::cycles::CycleSnapshot;
use crate::error::Result;
#[cfg(test)]
use crate::pal::MockPlatform;
use crate::pal::{
    BUILD_TARGET_PLATFORM, BuildTargetPlatform, Platform, RawProcessHandle, RawThreadHandle,
};

/// Hides the real/mock platform choice behind a single concrete type.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Real(&'static BuildTargetPlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn current_thread_cycles(&self) -> Result<CycleSnapshot> {
        match self {
            Self::Real(platform) => platform.current_thread_cycles(),
            #[cfg(test)]
            Self::Mock(platform) => platform.current_thread_cycles(),
        }
    }

    fn thread_cycles(&self, thread: RawThreadHandle) -> Result<CycleSnapshot> {
        match self {
            Self::Real(platform) => platform.thread_cycles(thread),
            #[cfg(test)]
            Self::Mock(platform) => platform.thread_cycles(thread),
        }
    }

    fn process_cycles(&self, process: RawProcessHandle) -> Result<CycleSnapshot> {
        match self {
            Self::Real(platform) => platform.process_cycles(process),
            #[cfg(test)]
            Self::Mock(platform) => platform.process_cycles(process),
        }
    }

    fn idle_processor_cycles(&self) -> Result<Vec<CycleSnapshot>> {
        match self {
            Self::Real(platform) => platform.idle_processor_cycles(),
            #[cfg(test)]
            Self::Mock(platform) => platform.idle_processor_cycles(),
        }
    }

    fn processor_count(&self) -> usize {
        match self {
            Self::Real(platform) => platform.processor_count(),
            #[cfg(test)]
            Self::Mock(platform) => platform.processor_count(),
        }
    }

    fn timestamp(&self) -> u64 {
        match self {
            Self::Real(platform) => platform.timestamp(),
            #[cfg(test)]
            Self::Mock(platform) => platform.timestamp(),
        }
    }

    fn frequency(&self) -> u64 {
        match self {
            Self::Real(platform) => platform.frequency(),
            #[cfg(test)]
            Self::Mock(platform) => platform.frequency(),
        }
    }
}

impl From<&'static BuildTargetPlatform> for PlatformFacade {
    fn from(platform: &'static BuildTargetPlatform) -> Self {
        Self::Real(platform)
    }
}

#[cfg(test)]
impl From<MockPlatform> for PlatformFacade {
    fn from(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(platform) => platform.fmt(f),
            #[cfg(test)]
            Self::Mock(platform) => platform.fmt(f),
        }
    }
}
