//! Subjects of cycle measurement.

#[cfg(unix)]
use std::os::unix::thread::JoinHandleExt;
#[cfg(windows)]
use std::os::windows::io::AsRawHandle;
use std::process;
use std::thread::JoinHandle;

use crate::pal::{RawProcessHandle, RawThreadHandle};

/// The entity whose cycle consumption a session or tracker measures, fixed
/// at construction.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub enum Subject {
    /// The thread that makes the measurement calls.
    CurrentThread,

    /// A specific thread, identified via its join handle.
    Thread(ThreadSubject),

    /// A whole process: all of its threads, including ones that have
    /// already exited.
    Process(ProcessSubject),
}

/// A thread whose cycle consumption can be measured.
///
/// This is an identity, not a borrow: it copies the raw platform identity
/// out of a [`JoinHandle`] and stays valid for as long as that handle is
/// alive and unjoined. A thread that has finished its work but has not been
/// joined still has its cycle accounting available. Queries against a
/// subject whose thread is gone fail with
/// [`InvalidHandle`](crate::Error::InvalidHandle) rather than producing
/// counts for some unrelated recycled identity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ThreadSubject {
    raw: RawThreadHandle,
}

impl ThreadSubject {
    /// Identifies the thread behind `handle` as a measurement subject.
    #[must_use]
    pub fn from_join_handle<T>(handle: &JoinHandle<T>) -> Self {
        #[cfg(unix)]
        let raw = {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "pthread_t is at most pointer-sized on every supported target"
            )]
            let bits = handle.as_pthread_t() as usize;

            RawThreadHandle(bits as u64)
        };

        #[cfg(windows)]
        let raw = RawThreadHandle(handle.as_raw_handle() as usize as u64);

        #[cfg(not(any(unix, windows)))]
        let raw = {
            _ = handle;
            RawThreadHandle(0)
        };

        Self { raw }
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: RawThreadHandle) -> Self {
        Self { raw }
    }

    pub(crate) fn raw(self) -> RawThreadHandle {
        self.raw
    }
}

/// A process whose cycle consumption can be measured, identified by its
/// process ID.
///
/// Process cycle accounting covers every thread the process has ever had,
/// so the reading keeps the contributions of threads that exited before the
/// query.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ProcessSubject {
    raw: RawProcessHandle,
}

impl ProcessSubject {
    /// The calling process.
    #[must_use]
    pub fn current() -> Self {
        Self::from_pid(process::id())
    }

    /// The process with the given process ID.
    #[must_use]
    pub fn from_pid(pid: u32) -> Self {
        Self {
            raw: RawProcessHandle(pid),
        }
    }

    /// The process ID this subject names.
    #[must_use]
    pub fn pid(self) -> u32 {
        self.raw.0
    }

    pub(crate) fn raw(self) -> RawProcessHandle {
        self.raw
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;
    #[cfg(any(unix, windows))]
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Subject: Send, Sync, Debug);
    assert_impl_all!(ThreadSubject: Send, Sync, Debug);
    assert_impl_all!(ProcessSubject: Send, Sync, Debug);

    #[test]
    fn current_process_subject_names_self() {
        let subject = ProcessSubject::current();

        assert_eq!(subject.pid(), process::id());
    }

    #[test]
    fn process_subjects_with_same_pid_are_equal() {
        assert_eq!(ProcessSubject::from_pid(42), ProcessSubject::from_pid(42));
        assert_ne!(ProcessSubject::from_pid(42), ProcessSubject::from_pid(43));
    }

    #[cfg(any(unix, windows))]
    #[test]
    fn distinct_threads_have_distinct_identities() {
        let first = thread::spawn(|| {});
        let second = thread::spawn(|| {});

        let first_subject = ThreadSubject::from_join_handle(&first);
        let second_subject = ThreadSubject::from_join_handle(&second);

        assert_ne!(first_subject, second_subject);

        first.join().unwrap();
        second.join().unwrap();
    }
}
