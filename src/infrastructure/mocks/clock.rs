//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Manually driven clock.
///
/// Time only moves when a test calls [`advance`](Self::advance) or
/// [`set_elapsed`](Self::set_elapsed), which makes window boundaries exact.
/// Clones share the same timeline.
///
/// # Examples
///
/// ```
/// use stream_dedupe::infrastructure::mocks::MockClock;
/// use stream_dedupe::application::ports::Clock;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let clock = MockClock::new(start);
/// assert_eq!(clock.now(), start);
///
/// clock.advance_millis(500);
/// assert_eq!(clock.now(), start + Duration::from_millis(500));
///
/// let other = clock.clone();
/// other.advance(Duration::from_millis(501));
/// assert_eq!(clock.elapsed(), Duration::from_millis(1001));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl MockClock {
    /// Create a mock clock whose time starts at `origin`.
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        self.offset_nanos
            .fetch_add(duration_nanos(duration), Ordering::SeqCst);
    }

    /// Move time forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Place the clock at `origin + elapsed`. May move time backwards.
    pub fn set_elapsed(&self, elapsed: Duration) {
        self.offset_nanos
            .store(duration_nanos(elapsed), Ordering::SeqCst);
    }

    /// Time elapsed since `origin`.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }

    /// The instant the clock started at.
    pub fn origin(&self) -> Instant {
        self.origin
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::window::ExpirationWindow;

    #[test]
    fn test_mock_clock_drives_expiry() {
        let clock = MockClock::new(Instant::now());
        let window = ExpirationWindow::from_millis(50).unwrap();
        let inserted = clock.now();

        clock.advance_millis(49);
        assert!(!window.is_expired(inserted, clock.now()));

        clock.advance_millis(1);
        assert!(window.is_expired(inserted, clock.now()));
    }

    #[test]
    fn test_set_elapsed_moves_backwards() {
        let start = Instant::now();
        let clock = MockClock::new(start);

        clock.advance(Duration::from_secs(10));
        clock.set_elapsed(Duration::from_secs(3));
        assert_eq!(clock.now(), start + Duration::from_secs(3));
        assert_eq!(clock.origin(), start);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = MockClock::new(Instant::now());
        let handle = {
            let clock = clock.clone();
            std::thread::spawn(move || clock.advance_millis(25))
        };
        handle.join().unwrap();

        assert_eq!(clock.elapsed(), Duration::from_millis(25));
    }
}
