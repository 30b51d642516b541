use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::{MemoryPressureSource, ReusePool};

/// Builder for creating an instance of [`ReusePool`].
///
/// The only configurable behavior is the memory-pressure wiring: a pool built
/// with a [`MemoryPressureSource`] subscribes to it once and discards all
/// unused instances on every notification.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use reuse_pool::{
///     MemoryPressureListener, MemoryPressureSource, MemoryPressureSubscription, ReusePool,
/// };
///
/// /// A host signal that delivers notifications when `fire()` is called.
/// #[derive(Default)]
/// struct Signal {
///     listeners: Arc<Mutex<Vec<MemoryPressureListener>>>,
/// }
///
/// impl Signal {
///     fn fire(&self) {
///         for listener in self.listeners.lock().unwrap().iter() {
///             listener();
///         }
///     }
/// }
///
/// impl MemoryPressureSource for Signal {
///     fn subscribe(&self, listener: MemoryPressureListener) -> MemoryPressureSubscription {
///         self.listeners.lock().unwrap().push(listener);
///         MemoryPressureSubscription::new(|| {})
///     }
/// }
///
/// let signal = Signal::default();
///
/// let pool = ReusePool::<String>::builder()
///     .memory_pressure(&signal)
///     .build();
///
/// pool.register("row", |_| String::from("fresh"));
/// pool.enqueue(String::from("recycled"), "row").unwrap();
///
/// signal.fire();
///
/// // Unused instances are gone; the registration survives.
/// assert_eq!(pool.unused_count("row"), Some(0));
/// assert!(pool.is_registered("row"));
/// ```
#[must_use]
pub struct ReusePoolBuilder<'s, T, C = ()> {
    memory_pressure: Option<&'s dyn MemoryPressureSource>,
    _marker: PhantomData<(T, C)>,
}

impl<'s, T, C> ReusePoolBuilder<'s, T, C>
where
    T: Eq + Hash + Send + 'static,
    C: 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            memory_pressure: None,
            _marker: PhantomData,
        }
    }

    /// Wires a host-provided memory-pressure source into the pool.
    ///
    /// The pool subscribes when [`build()`][Self::build] runs and stays
    /// subscribed until its last handle is dropped. Each notification has
    /// the same effect as calling [`ReusePool::clear_unused()`].
    pub fn memory_pressure(mut self, source: &'s dyn MemoryPressureSource) -> Self {
        self.memory_pressure = Some(source);
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use reuse_pool::ReusePool;
    ///
    /// let pool = ReusePool::<String>::builder().build();
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn build(self) -> ReusePool<T, C> {
        ReusePool::new_inner(self.memory_pressure)
    }
}

impl<T, C> fmt::Debug for ReusePoolBuilder<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReusePoolBuilder")
            .field("memory_pressure", &self.memory_pressure.is_some())
            .finish_non_exhaustive()
    }
}
