//! Example demonstrating basic usage of `ReusePool`.
//!
//! This shows the thread-safe pool: register an init handler per reuse
//! identifier, dequeue instances for use, enqueue them back for reuse.

use reuse_pool::ReusePool;

fn main() {
    println!("=== ReusePool: Thread-safe, Keyed Recycling ===");

    let pool = ReusePool::<String>::new();

    // Each reuse identifier gets its own factory.
    pool.register("row", |_| String::from("a fresh row"));
    pool.register("header", |_| String::from("a fresh header"));

    // Nothing recycled yet: the factories run.
    let row = pool.dequeue("row").unwrap();
    let header = pool.dequeue("header").unwrap();
    println!("Constructed: {row}, {header}");

    // Hand the instances back for reuse.
    pool.enqueue(row, "row").unwrap();
    pool.enqueue(header, "header").unwrap();
    println!(
        "Pooled rows: {:?}, pooled headers: {:?}",
        pool.unused_count("row"),
        pool.unused_count("header")
    );

    // Recycled instances are preferred over the factory.
    let recycled_row = pool.dequeue("row").unwrap();
    println!("Recycled: {recycled_row}");

    // Thread-safe sharing.
    let pool_clone = pool.clone();
    std::thread::spawn(move || {
        let from_thread = pool_clone.dequeue("header").unwrap();
        println!("From thread: {from_thread}");
    })
    .join()
    .unwrap();

    // Unknown identifiers fail with a recoverable, identifier-bearing error.
    let error = pool.dequeue("footer").unwrap_err();
    println!("Expected failure: {error}");
}
