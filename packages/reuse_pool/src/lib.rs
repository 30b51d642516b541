//! This package provides [`ReusePool`], a keyed object pool that hands out
//! recycled instances by reuse identifier, constructing new ones on demand.
//!
//! Callers register an init handler per reuse identifier; dequeuing returns
//! a previously recycled instance when one is available and falls back to
//! the handler otherwise. Instances go back into the pool via enqueue. An
//! optional host-injected memory-pressure signal evicts all unused
//! instances at once.
//!
//! # Features
//!
//! - **Keyed recycling**: independent slots per reuse identifier string.
//! - **Factory fallback**: a per-identifier init handler constructs fresh
//!   instances, optionally parameterized by a caller-supplied context.
//! - **Set semantics**: unused instances live in an unordered set; equal
//!   instances collapse and dequeue order is unspecified.
//! - **Thread-safe and single-threaded variants**: [`ReusePool`] for
//!   multi-threaded use, [`LocalReusePool`] for single-threaded
//!   performance, [`RawReusePool`] for direct ownership.
//! - **Event-driven eviction**: an injected [`MemoryPressureSource`]
//!   triggers bulk eviction of unused instances; there is no capacity
//!   limit, TTL or LRU policy.
//!
//! # Example
//!
//! ```rust
//! use reuse_pool::ReusePool;
//!
//! // Create a thread-safe pool of string instances.
//! let pool = ReusePool::<String>::new();
//!
//! // Each reuse identifier gets a factory for fresh instances.
//! pool.register("row", |_| String::from("fresh row"));
//!
//! // Nothing recycled yet: the factory runs.
//! let row = pool.dequeue("row").unwrap();
//! assert_eq!(row, "fresh row");
//!
//! // Hand the instance back for reuse.
//! pool.enqueue(row, "row").unwrap();
//!
//! // The recycled instance is preferred over the factory.
//! let row_again = pool.dequeue("row").unwrap();
//! assert_eq!(row_again, "fresh row");
//! ```
//!
//! For single-threaded use:
//!
//! ```rust
//! use reuse_pool::LocalReusePool;
//!
//! // Create a single-threaded pool (more efficient).
//! let pool = LocalReusePool::<Vec<u8>>::new();
//! pool.register("buffer", |_| Vec::new());
//!
//! let buffer = pool.dequeue("buffer").unwrap();
//! assert!(buffer.is_empty());
//! ```
//!
//! Init handlers can branch on a context supplied at dequeue time:
//!
//! ```rust
//! use reuse_pool::ReusePool;
//!
//! let pool = ReusePool::<String, String>::new();
//! pool.register("cell", |context| {
//!     context.map_or_else(|| String::from("plain cell"), |style| format!("{style} cell"))
//! });
//!
//! let styled = pool
//!     .dequeue_with_context("cell", &String::from("fancy"))
//!     .unwrap();
//! assert_eq!(styled, "fancy cell");
//! ```

mod builder;
mod constants;
mod error;
mod local_pool;
mod memory_pressure;
mod pool;
mod raw_pool;

pub use builder::*;
pub use error::*;
pub use local_pool::*;
pub use memory_pressure::*;
pub use pool::*;
pub use raw_pool::*;
