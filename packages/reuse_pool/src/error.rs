use std::fmt;

use thiserror::Error;

/// Errors that can occur when dequeuing instances from a reuse pool.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller referenced a reuse identifier that has never been registered,
    /// or that has since been deregistered.
    ///
    /// Recoverable: register an init handler for the identifier first.
    #[error("unknown reuse identifier '{reuse_identifier}'")]
    UnknownReuseIdentifier {
        /// The reuse identifier the caller passed.
        reuse_identifier: String,
    },

    /// A slot exists for the reuse identifier but carries no init handler.
    ///
    /// The pool stores the init handler and the unused instances in a single
    /// slot record, so this state is never produced by the current
    /// implementation. The variant remains part of the contract so that the
    /// error surface stays stable if a future revision allows a slot to
    /// outlive its handler.
    #[error("no init handler registered for reuse identifier '{reuse_identifier}'")]
    NoInitHandler {
        /// The reuse identifier the caller passed.
        reuse_identifier: String,
    },
}

/// A specialized `Result` type for reuse pool operations, returning the
/// crate's [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;

/// The error returned when enqueueing an instance under a reuse identifier
/// that has no registered slot.
///
/// Carries the rejected instance, so a failed recycle never destroys the
/// value; reclaim it with [`into_value()`][Self::into_value]. Callers who
/// prefer the unified [`Error`] enum can convert via `From`, which discards
/// the instance.
///
/// # Example
///
/// ```
/// use reuse_pool::RawReusePool;
///
/// let mut pool = RawReusePool::<String>::new();
///
/// let error = pool
///     .enqueue(String::from("orphan"), "never-registered")
///     .unwrap_err();
///
/// assert_eq!(error.reuse_identifier(), "never-registered");
/// assert_eq!(error.into_value(), "orphan");
/// ```
#[derive(Error)]
#[error("cannot enqueue for unknown reuse identifier '{reuse_identifier}'")]
pub struct EnqueueError<T> {
    value: T,
    reuse_identifier: String,
}

impl<T> EnqueueError<T> {
    pub(crate) fn new(value: T, reuse_identifier: String) -> Self {
        Self {
            value,
            reuse_identifier,
        }
    }

    /// The reuse identifier that had no registered slot.
    #[must_use]
    pub fn reuse_identifier(&self) -> &str {
        &self.reuse_identifier
    }

    /// Consumes the error, returning the instance that could not be enqueued.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }
}

// Omits the rejected value, so the error stays usable with instance types
// that are not `Debug`.
impl<T> fmt::Debug for EnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnqueueError")
            .field("reuse_identifier", &self.reuse_identifier)
            .finish_non_exhaustive()
    }
}

impl<T> From<EnqueueError<T>> for Error {
    /// Discards the rejected instance and keeps only the identifier.
    fn from(error: EnqueueError<T>) -> Self {
        Self::UnknownReuseIdentifier {
            reuse_identifier: error.reuse_identifier,
        }
    }
}
