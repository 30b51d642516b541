//! The seam between the pool and the host environment's memory-pressure
//! notifications.
//!
//! The pool never talks to a process-wide notification mechanism directly.
//! The host implements [`MemoryPressureSource`] over whatever signal it has
//! (an OS low-memory notification, a runtime callback, a test fixture) and
//! injects it via [`ReusePoolBuilder::memory_pressure()`][1]. This keeps the
//! pool independently testable: tests trigger the listener directly.
//!
//! [1]: crate::ReusePoolBuilder::memory_pressure

use std::fmt;

/// The callback a pool registers with a [`MemoryPressureSource`].
///
/// Invoked by the host environment, on any thread, each time it detects
/// memory pressure. Carries no payload; the signal itself is the message.
pub type MemoryPressureListener = Box<dyn Fn() + Send + Sync>;

/// A host-provided source of memory-pressure notifications.
///
/// # Example
///
/// ```rust
/// use reuse_pool::{MemoryPressureListener, MemoryPressureSource, MemoryPressureSubscription};
///
/// /// A source that never signals and needs no release bookkeeping.
/// struct Quiet;
///
/// impl MemoryPressureSource for Quiet {
///     fn subscribe(&self, _listener: MemoryPressureListener) -> MemoryPressureSubscription {
///         MemoryPressureSubscription::new(|| {})
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait MemoryPressureSource {
    /// Begins delivering memory-pressure notifications to `listener`.
    ///
    /// Delivery continues until the returned subscription is dropped, after
    /// which the source must no longer invoke the listener.
    fn subscribe(&self, listener: MemoryPressureListener) -> MemoryPressureSubscription;
}

/// RAII guard for an active memory-pressure subscription.
///
/// Dropping the guard releases the subscription exactly once. Sources
/// construct one via [`new()`][Self::new], packaging whatever bookkeeping
/// they need to stop delivering notifications.
#[must_use]
pub struct MemoryPressureSubscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl MemoryPressureSubscription {
    /// Creates a subscription guard that invokes `release` when dropped.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl fmt::Debug for MemoryPressureSubscription {
    #[cfg_attr(test, mutants::skip)] // Diagnostic output only, not worth mutating.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPressureSubscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for MemoryPressureSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(MemoryPressureSubscription: Send, Debug);

    #[test]
    fn dropping_subscription_releases_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&releases);

        let subscription = MemoryPressureSubscription::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(releases.load(Ordering::Relaxed), 0);
        drop(subscription);
        assert_eq!(releases.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn mock_source_delivers_to_listener() {
        let mut source = MockMemoryPressureSource::new();
        source.expect_subscribe().times(1).returning(|listener| {
            // Deliver one notification immediately, then release.
            listener();
            MemoryPressureSubscription::new(|| {})
        });

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let _subscription = source.subscribe(Box::new(move || {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        assert_eq!(fired.load(Ordering::Relaxed), 1);
    }
}
