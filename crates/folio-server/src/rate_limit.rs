//! Fixed-window request counting per client identifier.
//!
//! One process-wide table guarded by a mutex; a request that lands
//! exactly between two unsynchronized checks may double-count, which
//! is accepted imprecision for this use.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Sweep expired windows once the table grows past this many entries.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Unix seconds at which the client's current window resets.
    pub reset: u64,
}

#[derive(Debug)]
struct Window {
    count: u32,
    expires: Instant,
    reset_unix: u64,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    fn fresh_window(&self, now: Instant) -> Window {
        let reset_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs() + self.window.as_secs())
            .unwrap_or_default();
        Window {
            count: 0,
            expires: now + self.window,
            reset_unix,
        }
    }

    /// Count one request for `key` and decide whether it may proceed.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter lock");

        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, window| window.expires > now);
        }

        let window = windows
            .entry(key.to_string())
            .or_insert_with(|| self.fresh_window(now));
        if window.expires <= now {
            *window = self.fresh_window(now);
        }

        if window.count < self.limit {
            window.count += 1;
            RateLimitDecision {
                allowed: true,
                limit: self.limit,
                remaining: self.limit - window.count,
                reset: window.reset_unix,
            }
        } else {
            RateLimitDecision {
                allowed: false,
                limit: self.limit,
                remaining: 0,
                reset: window.reset_unix,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_first_request_in_window_is_denied() {
        let limiter = RateLimiter::new(20, Duration::from_secs(60));

        for i in 0..20 {
            let decision = limiter.check("1.2.3.4");
            assert!(decision.allowed, "request {} should pass", i + 1);
            assert_eq!(decision.remaining, 19 - i);
        }

        let decision = limiter.check("1.2.3.4");
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.limit, 20);
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("a").allowed);
        assert!(!limiter.check("a").allowed);
        assert!(limiter.check("b").allowed);
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = RateLimiter::new(20, Duration::from_millis(40));

        for _ in 0..20 {
            assert!(limiter.check("1.2.3.4").allowed);
        }
        assert!(!limiter.check("1.2.3.4").allowed);

        std::thread::sleep(Duration::from_millis(60));

        let decision = limiter.check("1.2.3.4");
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 19);
    }

    #[test]
    fn reset_is_in_the_future() {
        let limiter = RateLimiter::new(20, Duration::from_secs(60));
        let now_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let decision = limiter.check("1.2.3.4");
        assert!(decision.reset >= now_unix + 59);
    }
}
