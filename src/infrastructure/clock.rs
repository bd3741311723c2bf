//! Production clock for timestamping seen keys.
//!
//! Tests substitute `MockClock` from `crate::infrastructure::mocks`, which
//! is compiled in test builds and with the `test-helpers` feature.

use crate::application::ports::Clock;
use std::sync::Arc;
use std::time::Instant;

/// Monotonic clock backed by `Instant::now()`.
///
/// Wall-clock adjustments never make a stored key look younger or older
/// than it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }

    /// The system clock as the trait object filters and sweepers hold.
    pub fn shared() -> Arc<dyn Clock> {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
