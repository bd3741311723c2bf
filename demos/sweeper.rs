//! Example demonstrating background purging of expired keys.
//!
//! The sweeper runs on the tokio runtime and reclaims keys whose window has
//! passed, so a stream of ever-new keys does not grow the seen set forever.

use std::time::Duration;
use stream_dedupe::{key_fn, DedupeConfig, DedupeOperator, FilterFunction};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stream_dedupe=debug")),
        )
        .init();

    // Falls back to a short demo window when the environment is not set
    let config = DedupeConfig::from_env()
        .unwrap_or_else(|_| DedupeConfig::with_expiration_ms(500).with_sweep_interval_ms(200));
    println!("=== Sweeper Example ===\n");
    println!("Config: {config:?}\n");

    let mut op = DedupeOperator::builder(key_fn(|session: &String| session.clone()))
        .with_config(&config)
        .build()
        .expect("valid configuration");
    op.open().expect("first open");

    for round in 0..5 {
        for user in 0..100 {
            let session = format!("round{round}-user{user}");
            op.filter(&session).expect("string keys never fail");
        }
        println!(
            "round {round}: tracked keys = {}, purged so far = {}",
            op.tracked_keys(),
            op.metrics().entries_purged()
        );
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    op.shutdown().await.expect("sweeper shutdown");
    println!("\n=== Example Complete ===");
}
