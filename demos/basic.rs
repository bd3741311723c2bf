//! Basic example demonstrating time-windowed deduplication.
//!
//! Order events are keyed by order id. Retries of the same order inside
//! the two second window are dropped; once the window has elapsed the
//! next retry is admitted again.

use std::thread;
use std::time::Duration;
use stream_dedupe::{key_fn, DedupeIteratorExt, DedupeOperator};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct OrderEvent {
    order_id: u32,
    attempt: u32,
}

fn main() {
    // RUST_LOG=stream_dedupe=trace shows every decision
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut op = DedupeOperator::builder(key_fn(|e: &OrderEvent| e.order_id))
        .with_expiration(Duration::from_secs(2))
        .build()
        .expect("valid configuration");

    println!("=== Basic Dedupe Example ===\n");
    println!("Window: 2s from first sighting\n");

    let burst = vec![
        OrderEvent { order_id: 1, attempt: 1 },
        OrderEvent { order_id: 2, attempt: 1 },
        OrderEvent { order_id: 1, attempt: 2 },
        OrderEvent { order_id: 1, attempt: 3 },
        OrderEvent { order_id: 3, attempt: 1 },
    ];

    println!("First burst:");
    for event in burst.into_iter().deduplicate(&mut op) {
        println!("  forwarded {:?}", event.expect("u32 keys never fail"));
    }

    println!("\nWaiting for the window to elapse...\n");
    thread::sleep(Duration::from_millis(2100));

    println!("Second burst:");
    let retries = [
        OrderEvent { order_id: 1, attempt: 4 },
        OrderEvent { order_id: 1, attempt: 5 },
    ];
    for event in retries {
        let admitted = op.dedupe_filter().evaluate(&event).expect("filter is open");
        println!("  {:?} -> {}", event, if admitted { "forwarded" } else { "dropped" });
    }

    let snapshot = op.metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!(
        "admitted: {}, dropped: {}, duplicate rate: {:.0}%",
        snapshot.elements_admitted,
        snapshot.elements_rejected,
        snapshot.duplicate_rate() * 100.0
    );
}
