//! Mock implementations for testing.
//!
//! This module provides test doubles for infrastructure adapters,
//! enabling deterministic testing of expiry behavior.

pub mod clock;

pub use clock::MockClock;
