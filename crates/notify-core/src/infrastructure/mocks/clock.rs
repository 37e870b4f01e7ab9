//! Mock clock for testing.

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::ports::outbound::Clock;

/// Settable clock. Clones share the same time.
#[derive(Debug, Clone)]
pub struct MockClock {
    current_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { current_time: Arc::new(Mutex::new(start)) }
    }

    pub fn advance(&self, duration: Duration) {
        *self.current_time.lock() += duration;
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.current_time.lock() = time;
    }
}

impl Default for MockClock {
    /// 2025-01-01T00:00:00Z
    fn default() -> Self {
        Self::new(Utc.timestamp_opt(1_735_689_600, 0).single().unwrap_or_default())
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current_time.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let clock = MockClock::default();
        let start = clock.now();
        let other = clock.clone();
        other.advance(Duration::days(1));
        assert_eq!(clock.now(), start + Duration::days(1));

        clock.set(start);
        assert_eq!(other.now(), start);
    }
}
