use std::any::type_name;
use std::collections::hash_map::Entry;
use std::fmt;
use std::hash::Hash;

use foldhash::{HashMap, HashMapExt, HashSet, HashSetExt};
use tracing::{debug, trace};

use crate::{EnqueueError, Error, Result};

/// A function that constructs a fresh instance for a reuse identifier.
///
/// Invoked by [`RawReusePool::dequeue_with_context()`] whenever no recycled
/// instance is available; receives the context the caller passed to the
/// dequeue call, or `None` for the context-free form.
pub type InitHandler<T, C> = Box<dyn Fn(Option<&C>) -> T + Send>;

/// Everything the pool tracks for one reuse identifier.
///
/// Holding the handler and the unused instances in one record makes it
/// impossible for an identifier to have one without the other.
struct Slot<T, C> {
    init_handler: InitHandler<T, C>,
    unused: HashSet<T>,
}

/// A keyed object pool over instances of `T`, partitioned by reuse identifier.
///
/// For each reuse identifier, callers register an init handler that produces
/// a fresh instance from an optional context of type `C`. The pool then hands
/// out either a previously recycled instance or a freshly constructed one,
/// and accepts instances back for later reuse.
///
/// Instances must be `Eq + Hash`: each identifier's unused instances live in
/// an unordered set, so equal instances collapse to one entry and the choice
/// of recycled instance on dequeue is arbitrary.
///
/// # Example
///
/// ```rust
/// use reuse_pool::RawReusePool;
///
/// let mut pool = RawReusePool::<String>::new();
/// pool.register("greeting", |_| String::from("hello"));
///
/// // Nothing recycled yet, so the init handler runs.
/// let greeting = pool.dequeue("greeting").unwrap();
/// assert_eq!(greeting, "hello");
///
/// // Hand the instance back; the next dequeue reuses it.
/// pool.enqueue(greeting, "greeting").unwrap();
/// let recycled = pool.dequeue("greeting").unwrap();
/// assert_eq!(recycled, "hello");
/// ```
///
/// # Thread safety
///
/// This type takes `&mut self` for every mutation and performs no internal
/// locking. For a thread-safe pool, use [`ReusePool`][crate::ReusePool]; for
/// a cloneable single-threaded handle, use
/// [`LocalReusePool`][crate::LocalReusePool].
pub struct RawReusePool<T, C = ()> {
    /// One slot per registered reuse identifier. We use foldhash for better
    /// performance with small hash tables.
    slots: HashMap<String, Slot<T, C>>,
}

impl<T, C> RawReusePool<T, C>
where
    T: Eq + Hash,
{
    /// Creates a new `RawReusePool` with no registered reuse identifiers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::RawReusePool;
    ///
    /// let pool = RawReusePool::<String>::new();
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Registers an init handler for a reuse identifier.
    ///
    /// Always succeeds. Registering an identifier that is already registered
    /// replaces its init handler; any instances already recycled under that
    /// identifier remain available for reuse. However many times an
    /// identifier is registered, the pool holds exactly one slot for it.
    ///
    /// # Panics
    ///
    /// Panics if the reuse identifier is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::RawReusePool;
    ///
    /// let mut pool = RawReusePool::<String>::new();
    ///
    /// pool.register("row", |_| String::from("first"));
    /// pool.register("row", |_| String::from("second"));
    ///
    /// // One slot, latest handler.
    /// assert_eq!(pool.len(), 1);
    /// assert_eq!(pool.dequeue("row").unwrap(), "second");
    /// ```
    pub fn register<F>(&mut self, reuse_identifier: impl Into<String>, init_handler: F)
    where
        F: Fn(Option<&C>) -> T + Send + 'static,
    {
        let reuse_identifier = reuse_identifier.into();
        assert!(
            !reuse_identifier.is_empty(),
            "reuse identifier must not be empty"
        );

        match self.slots.entry(reuse_identifier) {
            Entry::Occupied(mut entry) => {
                debug!(
                    reuse_identifier = entry.key().as_str(),
                    retained = entry.get().unused.len(),
                    "replacing init handler for already registered reuse identifier"
                );
                entry.get_mut().init_handler = Box::new(init_handler);
            }
            Entry::Vacant(entry) => {
                debug!(
                    reuse_identifier = entry.key().as_str(),
                    "registering reuse identifier"
                );
                entry.insert(Slot {
                    init_handler: Box::new(init_handler),
                    unused: HashSet::new(),
                });
            }
        }
    }

    /// Removes a reuse identifier, discarding its init handler and any
    /// instances recycled under it.
    ///
    /// Silently does nothing if the identifier is not registered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::RawReusePool;
    ///
    /// let mut pool = RawReusePool::<String>::new();
    /// pool.register("row", |_| String::new());
    ///
    /// pool.deregister("row");
    /// assert!(!pool.is_registered("row"));
    ///
    /// // Deregistering again is a no-op.
    /// pool.deregister("row");
    /// ```
    pub fn deregister(&mut self, reuse_identifier: &str) {
        if let Some(slot) = self.slots.remove(reuse_identifier) {
            debug!(
                reuse_identifier,
                discarded = slot.unused.len(),
                "deregistered reuse identifier"
            );
        }
    }

    /// Removes and returns an instance for the given reuse identifier,
    /// invoking the init handler without a context if none is recycled.
    ///
    /// Equivalent to [`dequeue_with_context()`][Self::dequeue_with_context]
    /// with an absent context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownReuseIdentifier`] if the identifier has no
    /// registered slot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::RawReusePool;
    ///
    /// let mut pool = RawReusePool::<String>::new();
    /// pool.register("row", |_| String::from("fresh"));
    ///
    /// assert_eq!(pool.dequeue("row").unwrap(), "fresh");
    /// ```
    pub fn dequeue(&mut self, reuse_identifier: &str) -> Result<T> {
        self.dequeue_inner(reuse_identifier, None)
    }

    /// Removes and returns an instance for the given reuse identifier,
    /// passing `context` to the init handler if construction is needed.
    ///
    /// If any recycled instance is available, an arbitrary one is removed
    /// from the unused set and returned; in that case the context is unused
    /// and the init handler does not run. Otherwise the init handler is
    /// invoked with the context and its result is handed directly to the
    /// caller, without ever entering the unused set. The caller is
    /// responsible for eventually enqueueing the instance back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownReuseIdentifier`] if the identifier has no
    /// registered slot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::RawReusePool;
    ///
    /// let mut pool = RawReusePool::<String, String>::new();
    /// pool.register("label", |context| {
    ///     context.map_or_else(|| String::from("anonymous"), |name| format!("label-{name}"))
    /// });
    ///
    /// let labelled = pool
    ///     .dequeue_with_context("label", &String::from("alpha"))
    ///     .unwrap();
    /// assert_eq!(labelled, "label-alpha");
    ///
    /// let anonymous = pool.dequeue("label").unwrap();
    /// assert_eq!(anonymous, "anonymous");
    /// ```
    pub fn dequeue_with_context(&mut self, reuse_identifier: &str, context: &C) -> Result<T> {
        self.dequeue_inner(reuse_identifier, Some(context))
    }

    fn dequeue_inner(&mut self, reuse_identifier: &str, context: Option<&C>) -> Result<T> {
        let slot =
            self.slots
                .get_mut(reuse_identifier)
                .ok_or_else(|| Error::UnknownReuseIdentifier {
                    reuse_identifier: reuse_identifier.to_string(),
                })?;

        // Arbitrary element; the unused collection is an unordered set and
        // callers get no ordering guarantee.
        let recycled = slot.unused.extract_if(|_| true).next();

        if let Some(value) = recycled {
            trace!(
                reuse_identifier,
                remaining = slot.unused.len(),
                "dequeued recycled instance"
            );
            return Ok(value);
        }

        trace!(reuse_identifier, "nothing recycled, invoking init handler");
        Ok((slot.init_handler)(context))
    }

    /// Returns an instance to the pool for later reuse under the given reuse
    /// identifier.
    ///
    /// The unused instances form a set: enqueueing an instance equal to one
    /// already pooled collapses to a single entry and is not an error. Equal
    /// instances are interchangeable by the `Eq` contract, so which
    /// representation the set retains is not observable.
    ///
    /// # Errors
    ///
    /// Returns [`EnqueueError`] if the identifier has no registered slot.
    /// The error carries the rejected instance back to the caller.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::RawReusePool;
    ///
    /// let mut pool = RawReusePool::<String>::new();
    /// pool.register("row", |_| String::new());
    ///
    /// pool.enqueue(String::from("recycled"), "row").unwrap();
    /// assert_eq!(pool.unused_count("row"), Some(1));
    ///
    /// assert_eq!(pool.dequeue("row").unwrap(), "recycled");
    /// assert_eq!(pool.unused_count("row"), Some(0));
    /// ```
    pub fn enqueue(
        &mut self,
        value: T,
        reuse_identifier: &str,
    ) -> std::result::Result<(), EnqueueError<T>> {
        let Some(slot) = self.slots.get_mut(reuse_identifier) else {
            return Err(EnqueueError::new(value, reuse_identifier.to_string()));
        };

        let inserted = slot.unused.insert(value);
        trace!(
            reuse_identifier,
            collapsed = !inserted,
            pooled = slot.unused.len(),
            "enqueued instance for reuse"
        );

        Ok(())
    }

    /// Discards every unused instance while keeping every registration.
    ///
    /// This is the pool's only eviction mechanism; it is what a
    /// memory-pressure signal triggers. Subsequent dequeues fall through to
    /// the init handlers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reuse_pool::RawReusePool;
    ///
    /// let mut pool = RawReusePool::<String>::new();
    /// pool.register("row", |_| String::from("fresh"));
    /// pool.enqueue(String::from("recycled"), "row").unwrap();
    ///
    /// pool.clear_unused();
    ///
    /// assert!(pool.is_registered("row"));
    /// assert_eq!(pool.unused_count("row"), Some(0));
    /// assert_eq!(pool.dequeue("row").unwrap(), "fresh");
    /// ```
    pub fn clear_unused(&mut self) {
        let discarded: usize = self.slots.values().map(|slot| slot.unused.len()).sum();

        for slot in self.slots.values_mut() {
            slot.unused.clear();
        }

        debug!(discarded, "cleared all unused instances");
    }
}

impl<T, C> RawReusePool<T, C> {
    /// Returns the number of registered reuse identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns whether the pool has no registered reuse identifiers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns whether the given reuse identifier is currently registered.
    #[must_use]
    pub fn is_registered(&self, reuse_identifier: &str) -> bool {
        self.slots.contains_key(reuse_identifier)
    }

    /// Returns the number of unused instances recycled under the given reuse
    /// identifier, or `None` if the identifier is not registered.
    #[must_use]
    pub fn unused_count(&self, reuse_identifier: &str) -> Option<usize> {
        self.slots
            .get(reuse_identifier)
            .map(|slot| slot.unused.len())
    }
}

impl<T, C> Default for RawReusePool<T, C>
where
    T: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> fmt::Debug for RawReusePool<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("identifiers", &self.slots.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use static_assertions::assert_impl_all;

    use super::*;

    // The raw pool is thread-mobile; handlers are required to be Send.
    assert_impl_all!(RawReusePool<String>: Send);

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Widget {
        kind: &'static str,
        serial: u32,
    }

    fn widget_pool() -> RawReusePool<Widget> {
        let mut pool = RawReusePool::new();
        pool.register("widget", |_| Widget {
            kind: "constructed",
            serial: 0,
        });
        pool
    }

    #[test]
    fn registration_is_idempotent() {
        let mut pool = RawReusePool::<Widget>::new();

        for _ in 0..3 {
            pool.register("widget", |_| Widget {
                kind: "constructed",
                serial: 0,
            });
        }

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.unused_count("widget"), Some(0));
    }

    #[test]
    fn reregistration_replaces_handler_and_keeps_instances() {
        let mut pool = widget_pool();

        pool.enqueue(
            Widget {
                kind: "recycled",
                serial: 7,
            },
            "widget",
        )
        .unwrap();

        pool.register("widget", |_| Widget {
            kind: "replacement",
            serial: 0,
        });

        // The recycled instance survived the re-registration.
        assert_eq!(pool.unused_count("widget"), Some(1));
        assert_eq!(
            pool.dequeue("widget").unwrap(),
            Widget {
                kind: "recycled",
                serial: 7
            }
        );

        // The pool is empty again, so the replacement handler runs.
        assert_eq!(
            pool.dequeue("widget").unwrap(),
            Widget {
                kind: "replacement",
                serial: 0
            }
        );
    }

    #[test]
    #[should_panic(expected = "reuse identifier must not be empty")]
    fn registering_empty_identifier_panics() {
        let mut pool = RawReusePool::<Widget>::new();
        pool.register("", |_| Widget {
            kind: "constructed",
            serial: 0,
        });
    }

    #[test]
    fn identifiers_are_isolated() {
        let mut pool = RawReusePool::<Widget>::new();

        for kind in ["first", "second", "third"] {
            pool.register(kind, move |_| Widget { kind, serial: 0 });
        }

        pool.enqueue(
            Widget {
                kind: "first",
                serial: 1,
            },
            "first",
        )
        .unwrap();

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.unused_count("first"), Some(1));
        assert_eq!(pool.unused_count("second"), Some(0));
        assert_eq!(pool.unused_count("third"), Some(0));

        // Dequeuing from one identifier does not disturb another.
        let second = pool.dequeue("second").unwrap();
        assert_eq!(second.kind, "second");
        assert_eq!(pool.unused_count("first"), Some(1));
    }

    #[test]
    fn deregister_removes_handler_and_instances_together() {
        let mut pool = widget_pool();
        pool.enqueue(
            Widget {
                kind: "recycled",
                serial: 1,
            },
            "widget",
        )
        .unwrap();

        pool.deregister("widget");

        assert!(!pool.is_registered("widget"));
        assert_eq!(pool.unused_count("widget"), None);

        let error = pool.dequeue("widget").unwrap_err();
        assert!(matches!(
            error,
            Error::UnknownReuseIdentifier { reuse_identifier } if reuse_identifier == "widget"
        ));
    }

    #[test]
    fn dequeue_before_register_fails_with_identifier() {
        let mut pool = RawReusePool::<Widget>::new();

        let error = pool.dequeue("never-registered").unwrap_err();
        assert!(matches!(
            error,
            Error::UnknownReuseIdentifier { reuse_identifier }
                if reuse_identifier == "never-registered"
        ));
    }

    #[test]
    fn enqueue_before_register_returns_the_instance() {
        let mut pool = RawReusePool::<Widget>::new();

        let error = pool
            .enqueue(
                Widget {
                    kind: "orphan",
                    serial: 9,
                },
                "never-registered",
            )
            .unwrap_err();

        assert_eq!(error.reuse_identifier(), "never-registered");
        assert_eq!(
            error.into_value(),
            Widget {
                kind: "orphan",
                serial: 9
            }
        );
    }

    #[test]
    fn recycled_instance_is_preferred_over_init_handler() {
        let mut pool = widget_pool();

        pool.enqueue(
            Widget {
                kind: "recycled",
                serial: 7,
            },
            "widget",
        )
        .unwrap();

        assert_eq!(
            pool.dequeue("widget").unwrap(),
            Widget {
                kind: "recycled",
                serial: 7
            }
        );
        assert_eq!(pool.unused_count("widget"), Some(0));
    }

    #[test]
    fn init_handler_runs_for_every_dequeue_from_an_empty_pool() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invocations);

        let mut pool = RawReusePool::<Widget>::new();
        pool.register("widget", move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Widget {
                kind: "constructed",
                serial: 0,
            }
        });

        for _ in 0..3 {
            let widget = pool.dequeue("widget").unwrap();
            assert_eq!(widget.kind, "constructed");
        }

        // The handler result is never cached.
        assert_eq!(invocations.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn init_handler_receives_the_dequeue_context() {
        let mut pool = RawReusePool::<Widget, String>::new();
        pool.register("widget", |context| {
            let kind = match context.map(String::as_str) {
                Some("ctx-A") => "variant-a",
                Some("ctx-B") => "variant-b",
                _ => "default",
            };
            Widget { kind, serial: 0 }
        });

        let a = pool
            .dequeue_with_context("widget", &String::from("ctx-A"))
            .unwrap();
        let b = pool
            .dequeue_with_context("widget", &String::from("ctx-B"))
            .unwrap();
        let other = pool.dequeue("widget").unwrap();

        assert_eq!(a.kind, "variant-a");
        assert_eq!(b.kind, "variant-b");
        assert_eq!(other.kind, "default");
    }

    #[test]
    fn single_recycled_instance_is_exhausted_before_construction() {
        let mut pool = widget_pool();

        pool.enqueue(
            Widget {
                kind: "recycled",
                serial: 7,
            },
            "widget",
        )
        .unwrap();

        let kinds: Vec<&str> = (0..3)
            .map(|_| pool.dequeue("widget").unwrap().kind)
            .collect();

        assert_eq!(kinds, ["recycled", "constructed", "constructed"]);
    }

    #[test]
    fn duplicate_enqueue_collapses() {
        let mut pool = widget_pool();

        for _ in 0..2 {
            pool.enqueue(
                Widget {
                    kind: "recycled",
                    serial: 7,
                },
                "widget",
            )
            .unwrap();
        }

        assert_eq!(pool.unused_count("widget"), Some(1));
    }

    #[test]
    fn clear_unused_empties_sets_and_keeps_handlers() {
        let mut pool = RawReusePool::<Widget>::new();

        for kind in ["first", "second"] {
            pool.register(kind, move |_| Widget { kind, serial: 0 });
            pool.enqueue(Widget { kind, serial: 1 }, kind).unwrap();
        }

        pool.clear_unused();

        for kind in ["first", "second"] {
            assert!(pool.is_registered(kind));
            assert_eq!(pool.unused_count(kind), Some(0));

            // Dequeue still succeeds, falling through to the handler.
            assert_eq!(pool.dequeue(kind).unwrap(), Widget { kind, serial: 0 });
        }
    }
}
