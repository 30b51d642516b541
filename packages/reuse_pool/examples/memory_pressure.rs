//! Example demonstrating event-driven eviction via a memory-pressure source.
//!
//! The pool never talks to the operating system itself; the host wraps its
//! low-memory signal in a `MemoryPressureSource` and injects it at build
//! time. Here the "host" fires the signal manually.

use std::sync::{Arc, Mutex};

use reuse_pool::{
    MemoryPressureListener, MemoryPressureSource, MemoryPressureSubscription, ReusePool,
};

/// A host signal delivering notifications to subscribed listeners on demand.
#[derive(Default)]
struct HostSignal {
    listeners: Arc<Mutex<Vec<MemoryPressureListener>>>,
}

impl HostSignal {
    fn fire(&self) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener();
        }
    }
}

impl MemoryPressureSource for HostSignal {
    fn subscribe(&self, listener: MemoryPressureListener) -> MemoryPressureSubscription {
        self.listeners.lock().unwrap().push(listener);

        let listeners = Arc::clone(&self.listeners);
        MemoryPressureSubscription::new(move || {
            listeners.lock().unwrap().clear();
        })
    }
}

fn main() {
    println!("=== ReusePool: Memory-pressure Eviction ===");

    let signal = HostSignal::default();

    let pool = ReusePool::<Vec<u8>>::builder()
        .memory_pressure(&signal)
        .build();

    pool.register("buffer", |_| vec![0; 4096]);

    // Fill the pool with recycled buffers.
    for fill in 1..=3_u8 {
        pool.enqueue(vec![fill; 4096], "buffer").unwrap();
    }
    println!("Pooled buffers: {:?}", pool.unused_count("buffer"));

    // The host detects memory pressure; all unused instances are dropped.
    signal.fire();
    println!("After signal: {:?}", pool.unused_count("buffer"));

    // Registrations survive, so dequeue falls back to the factory.
    let buffer = pool.dequeue("buffer").unwrap();
    println!("Fresh buffer of {} bytes", buffer.len());
}
