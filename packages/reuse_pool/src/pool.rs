use std::any::type_name;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, Weak};

use crate::constants::ERR_POISONED_LOCK;
use crate::{
    EnqueueError, MemoryPressureSource, MemoryPressureSubscription, RawReusePool, Result,
    ReusePoolBuilder,
};

/// Shared state behind every clone of a [`ReusePool`] handle.
pub(crate) struct PoolInner<T, C> {
    /// One mutex guards the whole pool; every operation, including the
    /// memory-pressure callback, holds it for its full duration.
    raw: Mutex<RawReusePool<T, C>>,

    /// Released when the last handle drops this shared state.
    memory_pressure: Mutex<Option<MemoryPressureSubscription>>,
}

/// A thread-safe wrapper around [`RawReusePool`].
///
/// This type acts as a cloneable handle to a shared pool instance. Multiple
/// handles can exist simultaneously, and the underlying pool remains alive as
/// long as at least one handle exists.
///
/// Optionally, the pool subscribes to a host-provided
/// [`MemoryPressureSource`][crate::MemoryPressureSource] at construction
/// (see [`builder()`][Self::builder]); each notification discards all unused
/// instances while keeping every registration. The subscription is released
/// exactly once, when the last handle is dropped, and a signal that arrives
/// after that safely does nothing.
///
/// # Example
///
/// ```rust
/// use reuse_pool::ReusePool;
///
/// let pool = ReusePool::<String>::new();
/// pool.register("greeting", |_| String::from("hello"));
///
/// let greeting = pool.dequeue("greeting").unwrap();
/// assert_eq!(greeting, "hello");
///
/// pool.enqueue(greeting, "greeting").unwrap();
/// assert_eq!(pool.unused_count("greeting"), Some(1));
/// ```
///
/// # Thread safety
///
/// This type is thread-safe and can be freely shared across threads.
///
/// ```rust
/// use std::thread;
///
/// use reuse_pool::ReusePool;
///
/// let pool = ReusePool::<String>::new();
/// pool.register("row", |_| String::from("fresh"));
///
/// let pool_clone = pool.clone();
/// let value = thread::spawn(move || pool_clone.dequeue("row").unwrap())
///     .join()
///     .unwrap();
///
/// assert_eq!(value, "fresh");
/// ```
///
/// For single-threaded use, [`LocalReusePool`][crate::LocalReusePool] avoids
/// the locking overhead.
pub struct ReusePool<T, C = ()> {
    inner: Arc<PoolInner<T, C>>,
}

impl<T, C> ReusePool<T, C>
where
    T: Eq + Hash + Send + 'static,
    C: 'static,
{
    /// Creates a new [`ReusePool`] with no registered reuse identifiers and
    /// no memory-pressure subscription.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ReusePool;
    ///
    /// let pool = ReusePool::<String>::new();
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Returns a builder for creating a [`ReusePool`] with custom
    /// configuration, such as a memory-pressure source.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ReusePool;
    ///
    /// let pool = ReusePool::<String>::builder().build();
    /// assert!(pool.is_empty());
    /// ```
    pub fn builder<'s>() -> ReusePoolBuilder<'s, T, C> {
        ReusePoolBuilder::new()
    }

    pub(crate) fn new_inner(memory_pressure: Option<&dyn MemoryPressureSource>) -> Self {
        let inner = Arc::new(PoolInner {
            raw: Mutex::new(RawReusePool::new()),
            memory_pressure: Mutex::new(None),
        });

        if let Some(source) = memory_pressure {
            // The listener holds only a weak reference: a signal delivered
            // after the last handle is gone upgrades to `None` and no-ops.
            let weak: Weak<PoolInner<T, C>> = Arc::downgrade(&inner);
            let subscription = source.subscribe(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.raw.lock().expect(ERR_POISONED_LOCK).clear_unused();
                }
            }));

            *inner.memory_pressure.lock().expect(ERR_POISONED_LOCK) = Some(subscription);
        }

        Self { inner }
    }

    /// Registers an init handler for a reuse identifier.
    ///
    /// Re-registration replaces the handler while keeping any instances
    /// already recycled under the identifier; see
    /// [`RawReusePool::register()`].
    ///
    /// # Panics
    ///
    /// Panics if the reuse identifier is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ReusePool;
    ///
    /// let pool = ReusePool::<String>::new();
    /// pool.register("row", |_| String::from("fresh"));
    ///
    /// assert!(pool.is_registered("row"));
    /// ```
    pub fn register<F>(&self, reuse_identifier: impl Into<String>, init_handler: F)
    where
        F: Fn(Option<&C>) -> T + Send + 'static,
    {
        self.inner
            .raw
            .lock()
            .expect(ERR_POISONED_LOCK)
            .register(reuse_identifier, init_handler);
    }

    /// Removes a reuse identifier, discarding its init handler and any
    /// instances recycled under it. Silently does nothing if the identifier
    /// is not registered.
    pub fn deregister(&self, reuse_identifier: &str) {
        self.inner
            .raw
            .lock()
            .expect(ERR_POISONED_LOCK)
            .deregister(reuse_identifier);
    }

    /// Removes and returns an instance for the given reuse identifier,
    /// invoking the init handler without a context if none is recycled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownReuseIdentifier`][crate::Error::UnknownReuseIdentifier]
    /// if the identifier has no registered slot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ReusePool;
    ///
    /// let pool = ReusePool::<String>::new();
    /// pool.register("row", |_| String::from("fresh"));
    ///
    /// assert_eq!(pool.dequeue("row").unwrap(), "fresh");
    /// ```
    pub fn dequeue(&self, reuse_identifier: &str) -> Result<T> {
        self.inner
            .raw
            .lock()
            .expect(ERR_POISONED_LOCK)
            .dequeue(reuse_identifier)
    }

    /// Removes and returns an instance for the given reuse identifier,
    /// passing `context` to the init handler if construction is needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownReuseIdentifier`][crate::Error::UnknownReuseIdentifier]
    /// if the identifier has no registered slot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::ReusePool;
    ///
    /// let pool = ReusePool::<String, u32>::new();
    /// pool.register("row", |context| {
    ///     context.map_or_else(String::new, |index| format!("row-{index}"))
    /// });
    ///
    /// assert_eq!(pool.dequeue_with_context("row", &3).unwrap(), "row-3");
    /// ```
    pub fn dequeue_with_context(&self, reuse_identifier: &str, context: &C) -> Result<T> {
        self.inner
            .raw
            .lock()
            .expect(ERR_POISONED_LOCK)
            .dequeue_with_context(reuse_identifier, context)
    }

    /// Returns an instance to the pool for later reuse under the given reuse
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError`] carrying the rejected instance if the
    /// identifier has no registered slot.
    pub fn enqueue(
        &self,
        value: T,
        reuse_identifier: &str,
    ) -> std::result::Result<(), EnqueueError<T>> {
        self.inner
            .raw
            .lock()
            .expect(ERR_POISONED_LOCK)
            .enqueue(value, reuse_identifier)
    }

    /// Discards every unused instance while keeping every registration.
    ///
    /// This is what a memory-pressure notification triggers; hosts without a
    /// [`MemoryPressureSource`][crate::MemoryPressureSource] wired in can
    /// call it directly.
    pub fn clear_unused(&self) {
        self.inner
            .raw
            .lock()
            .expect(ERR_POISONED_LOCK)
            .clear_unused();
    }

    /// Returns the number of registered reuse identifiers.
    ///
    /// This operation may block if another thread is currently accessing the
    /// pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.raw.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Returns whether the pool has no registered reuse identifiers.
    ///
    /// This operation may block if another thread is currently accessing the
    /// pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.raw.lock().expect(ERR_POISONED_LOCK).is_empty()
    }

    /// Returns whether the given reuse identifier is currently registered.
    #[must_use]
    pub fn is_registered(&self, reuse_identifier: &str) -> bool {
        self.inner
            .raw
            .lock()
            .expect(ERR_POISONED_LOCK)
            .is_registered(reuse_identifier)
    }

    /// Returns the number of unused instances recycled under the given reuse
    /// identifier, or `None` if the identifier is not registered.
    #[must_use]
    pub fn unused_count(&self, reuse_identifier: &str) -> Option<usize> {
        self.inner
            .raw
            .lock()
            .expect(ERR_POISONED_LOCK)
            .unused_count(reuse_identifier)
    }
}

impl<T, C> Clone for ReusePool<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, C> From<RawReusePool<T, C>> for ReusePool<T, C>
where
    T: Eq + Hash + Send + 'static,
    C: 'static,
{
    /// Wraps an existing raw pool in thread-safe shared ownership, without a
    /// memory-pressure subscription.
    fn from(raw: RawReusePool<T, C>) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                raw: Mutex::new(raw),
                memory_pressure: Mutex::new(None),
            }),
        }
    }
}

impl<T, C> Default for ReusePool<T, C>
where
    T: Eq + Hash + Send + 'static,
    C: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> fmt::Debug for ReusePool<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identifiers = self.inner.raw.lock().map(|raw| raw.len()).ok();

        f.debug_struct(type_name::<Self>())
            .field("identifiers", &identifiers)
            .finish_non_exhaustive()
    }
}
