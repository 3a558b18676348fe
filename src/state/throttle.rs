// Event rate limiting.
// Frame-bound and time-bound throttles for scroll and resize handling.

use std::time::{Duration, Instant};

/// One UI tick.
pub const FRAME: Duration = Duration::from_millis(16);

/// Interval for progress and content-height recalculation.
pub const SCROLL_THROTTLE: Duration = Duration::from_millis(20);

/// Coalesces requests into at most one pending check per frame.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    scheduled: bool,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a check on the next frame. Returns false when one is already pending.
    pub fn request(&mut self) -> bool {
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Consume the pending check at the start of a frame.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.scheduled)
    }
}

/// Leading-edge throttle that remembers calls made during the wait and
/// flushes one of them once the interval has passed.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Instant>,
    trailing: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
            trailing: false,
        }
    }

    /// Returns true when the caller should run now.
    pub fn call(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.duration_since(last) < self.interval => {
                self.trailing = true;
                false
            }
            _ => {
                self.last_run = Some(now);
                self.trailing = false;
                true
            }
        }
    }

    /// Returns true when a deferred call is due.
    pub fn flush(&mut self, now: Instant) -> bool {
        if !self.trailing {
            return false;
        }
        match self.last_run {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_run = Some(now);
                self.trailing = false;
                true
            }
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(SCROLL_THROTTLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_throttle_coalesces() {
        let mut throttle = FrameThrottle::new();
        assert!(throttle.request());
        assert!(!throttle.request());
        assert!(!throttle.request());

        assert!(throttle.take());
        assert!(!throttle.take());
        assert!(throttle.request());
    }

    #[test]
    fn test_throttle_leading_and_trailing() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_millis(20));

        assert!(throttle.call(start));
        assert!(!throttle.call(start + Duration::from_millis(5)));
        assert!(!throttle.call(start + Duration::from_millis(10)));

        assert!(!throttle.flush(start + Duration::from_millis(15)));
        assert!(throttle.flush(start + Duration::from_millis(20)));
        assert!(!throttle.flush(start + Duration::from_millis(60)));

        assert!(throttle.call(start + Duration::from_millis(60)));
    }

    #[test]
    fn test_throttle_without_trailing_call() {
        let start = Instant::now();
        let mut throttle = Throttle::default();
        assert!(throttle.call(start));
        assert!(!throttle.flush(start + Duration::from_millis(100)));
    }
}
