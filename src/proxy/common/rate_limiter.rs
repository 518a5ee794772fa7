// Rate Limiter
// Fixed one-minute window per key, used to throttle the token endpoint

use dashmap::DashMap;
use tokio::time::{Duration, Instant};

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, (Instant, u32)>,
}

impl RateLimiter {
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: DashMap::new(),
        }
    }

    /// Count one request for `key`, false once the window budget is spent
    pub fn check(&self, key: &str) -> bool {
        // New keys first sweep out lapsed windows so the map stays bounded
        if !self.windows.contains_key(key) {
            self.purge_expired();
        }

        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_insert((now, 0));
        let (started, count) = entry.value_mut();

        if now.duration_since(*started) >= self.window {
            *started = now;
            *count = 0;
        }

        if *count >= self.max_requests {
            return false;
        }
        *count += 1;
        true
    }

    /// Drop every window that has run out, returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, (started, _)| now.duration_since(*started) < self.window);
        before - self.windows.len()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_per_key() {
        let limiter = RateLimiter::per_minute(3);
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));

        // Other keys have their own window
        assert!(limiter.check("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_millis(500));
        assert!(limiter.check("client"));
        assert!(!limiter.check("client"));

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(limiter.check("client"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lapsed_windows_are_dropped() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        for i in 0..1000 {
            assert!(limiter.check(&format!("10.0.{}.{}", i / 256, i % 256)));
        }
        assert_eq!(limiter.len(), 1000);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(limiter.check("10.9.9.9"));
        assert_eq!(limiter.len(), 1);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(limiter.purge_expired(), 1);
        assert!(limiter.is_empty());
    }
}
