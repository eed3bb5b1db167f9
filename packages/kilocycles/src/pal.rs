//! Platform Abstraction Layer (PAL). This is private API that exposes the
//! operating system's cycle accounting and wall-clock tick primitives behind
//! a mockable trait.

mod abstractions;
pub(crate) use abstractions::*;

mod facade;
pub(crate) use facade::*;

#[cfg(all(target_os = "linux", not(miri)))]
mod linux;
#[cfg(all(target_os = "linux", not(miri)))]
pub(crate) use linux::*;

#[cfg(all(windows, not(miri)))]
mod windows;
#[cfg(all(windows, not(miri)))]
pub(crate) use windows::*;

// The fallback module stands in as the primary implementation on platforms
// without cycle accounting support, as well as under Miri, which cannot make
// real system calls.
#[cfg(any(miri, not(any(target_os = "linux", windows))))]
mod fallback;
#[cfg(any(miri, not(any(target_os = "linux", windows))))]
pub(crate) use fallback::*;
