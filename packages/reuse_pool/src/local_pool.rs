use std::any::type_name;
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::{EnqueueError, RawReusePool, Result};

/// A single-threaded wrapper around [`RawReusePool`].
///
/// This type acts as a cloneable handle to a shared pool instance, without
/// the locking overhead of [`ReusePool`][crate::ReusePool]. Multiple handles
/// can exist simultaneously, and the underlying pool remains alive as long
/// as at least one handle exists.
///
/// There is no memory-pressure wiring here: a host signal may be delivered
/// on any thread, and this type never leaves the thread it was created on.
/// Hosts evict by calling [`clear_unused()`][Self::clear_unused] directly.
///
/// # Single-threaded design
///
/// This type is designed for single-threaded use and is neither [`Send`] nor
/// [`Sync`]. For multi-threaded scenarios, use
/// [`ReusePool`][crate::ReusePool] instead.
///
/// # Example
///
/// ```rust
/// use reuse_pool::LocalReusePool;
///
/// let pool = LocalReusePool::<String>::new();
/// pool.register("greeting", |_| String::from("hello"));
///
/// // Clone the pool handle for use in different parts of the code.
/// let pool_clone = pool.clone();
///
/// let greeting = pool_clone.dequeue("greeting").unwrap();
/// assert_eq!(greeting, "hello");
/// ```
pub struct LocalReusePool<T, C = ()> {
    inner: Rc<RefCell<RawReusePool<T, C>>>,
}

impl<T, C> LocalReusePool<T, C>
where
    T: Eq + Hash,
{
    /// Creates a new [`LocalReusePool`] with no registered reuse identifiers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::LocalReusePool;
    ///
    /// let pool = LocalReusePool::<String>::new();
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from(RawReusePool::new())
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
    pub fn register<F>(&self, reuse_identifier: impl Into<String>, init_handler: F)
    where
        F: Fn(Option<&C>) -> T + Send + 'static,
    {
        self.inner
            .borrow_mut()
            .register(reuse_identifier, init_handler);
    }

    /// Removes a reuse identifier, discarding its init handler and any
    /// instances recycled under it. Silently does nothing if the identifier
    /// is not registered.
    pub fn deregister(&self, reuse_identifier: &str) {
        self.inner.borrow_mut().deregister(reuse_identifier);
    }

    /// Removes and returns an instance for the given reuse identifier,
    /// invoking the init handler without a context if none is recycled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownReuseIdentifier`][crate::Error::UnknownReuseIdentifier]
    /// if the identifier has no registered slot.
    pub fn dequeue(&self, reuse_identifier: &str) -> Result<T> {
        self.inner.borrow_mut().dequeue(reuse_identifier)
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
    /// use reuse_pool::LocalReusePool;
    ///
    /// let pool = LocalReusePool::<String, u32>::new();
    /// pool.register("row", |context| {
    ///     context.map_or_else(String::new, |index| format!("row-{index}"))
    /// });
    ///
    /// assert_eq!(pool.dequeue_with_context("row", &3).unwrap(), "row-3");
    /// ```
    pub fn dequeue_with_context(&self, reuse_identifier: &str, context: &C) -> Result<T> {
        self.inner
            .borrow_mut()
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
        self.inner.borrow_mut().enqueue(value, reuse_identifier)
    }

    /// Discards every unused instance while keeping every registration.
    pub fn clear_unused(&self) {
        self.inner.borrow_mut().clear_unused();
    }

    /// Returns the number of registered reuse identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns whether the pool has no registered reuse identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Returns whether the given reuse identifier is currently registered.
    #[must_use]
    pub fn is_registered(&self, reuse_identifier: &str) -> bool {
        self.inner.borrow().is_registered(reuse_identifier)
    }

    /// Returns the number of unused instances recycled under the given reuse
    /// identifier, or `None` if the identifier is not registered.
    #[must_use]
    pub fn unused_count(&self, reuse_identifier: &str) -> Option<usize> {
        self.inner.borrow().unused_count(reuse_identifier)
    }
}

impl<T, C> Clone for LocalReusePool<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, C> From<RawReusePool<T, C>> for LocalReusePool<T, C>
where
    T: Eq + Hash,
{
    /// Wraps an existing raw pool in single-threaded shared ownership.
    fn from(raw: RawReusePool<T, C>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(raw)),
        }
    }
}

impl<T, C> Default for LocalReusePool<T, C>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> fmt::Debug for LocalReusePool<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identifiers = self.inner.try_borrow().map(|raw| raw.len()).ok();

        f.debug_struct(type_name::<Self>())
            .field("identifiers", &identifiers)
            .finish_non_exhaustive()
    }
}
