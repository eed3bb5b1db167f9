use std::io;

use thiserror::Error;

/// Errors that can occur when querying cycle counters or closing a timing session.
///
/// Every failure is surfaced as an error. A query that fails is never reported
/// as a zero reading because a genuinely idle subject and a failed query would
/// then be indistinguishable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The operating system declined or failed a counter query.
    ///
    /// Typical causes are missing platform support for the requested counter
    /// or insufficient privileges to read it.
    #[error("the platform declined or failed the counter query: {source}")]
    CounterUnavailable {
        /// The underlying operating system error.
        #[source]
        source: io::Error,
    },

    /// The subject handle does not name a live thread or process.
    ///
    /// Subjects are identified by raw platform handles, so a subject that
    /// exits between construction and query is detected here rather than
    /// producing counts for some unrelated recycled handle.
    #[error("the handle does not name a live thread or process: {source}")]
    InvalidHandle {
        /// The underlying operating system error.
        #[source]
        source: io::Error,
    },

    /// The idle processor query produced a different number of entries than
    /// the number of processors visible at call time.
    ///
    /// A truncated sequence is a fault, not a shorter answer, so the mismatch
    /// is surfaced instead of silently returning partial data.
    #[error("idle processor query produced {returned} entries where {requested} were requested")]
    SizeMismatch {
        /// Entries requested, equal to the processor count at call time.
        requested: usize,

        /// Entries the operating system actually produced.
        returned: usize,
    },

    /// A counter that is monotonic by contract read a smaller value than an
    /// earlier read of the same counter.
    ///
    /// This indicates counter wraparound or a handle that no longer names the
    /// original subject. The affected measurement is invalid and no delta is
    /// reported for it.
    #[error("monotonic counter moved backwards from {start} to {end}")]
    BackwardsCounter {
        /// The counter value captured at the start of the interval.
        start: u64,

        /// The counter value captured at the end of the interval.
        end: u64,
    },
}

/// A specialized `Result` type for kilocycles operations, returning the
/// crate's [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
