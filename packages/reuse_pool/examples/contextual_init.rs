//! Example demonstrating context-parameterized construction.
//!
//! Init handlers receive the context passed to `dequeue_with_context()`,
//! letting one reuse identifier produce instances tailored per call.

use reuse_pool::LocalReusePool;

fn main() {
    println!("=== ReusePool: Contextual Construction ===");

    // Pool of strings, with a string context.
    let pool = LocalReusePool::<String, String>::new();

    pool.register("cell", |context| {
        context.map_or_else(
            || String::from("plain cell"),
            |style| format!("{style} cell"),
        )
    });

    let plain = pool.dequeue("cell").unwrap();
    let fancy = pool
        .dequeue_with_context("cell", &String::from("fancy"))
        .unwrap();
    let compact = pool
        .dequeue_with_context("cell", &String::from("compact"))
        .unwrap();

    println!("Constructed: {plain}, {fancy}, {compact}");

    // A recycled instance bypasses the factory, so the context is unused.
    pool.enqueue(plain, "cell").unwrap();
    let recycled = pool
        .dequeue_with_context("cell", &String::from("ignored"))
        .unwrap();
    println!("Recycled: {recycled}");
}
