use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;

/// Fixed-window request counter per client IP.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, RequestWindow>>,
    requests_per_window: u32,
    window_duration: Duration,
}

#[derive(Debug)]
struct RequestWindow {
    window_start: Instant,
    request_count: u32,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            requests_per_window: requests_per_second * 60,
            window_duration: Duration::from_secs(60),
        }
    }

    pub fn get_client_key(&self, addr: &SocketAddr) -> String {
        addr.ip().to_string()
    }

    pub fn check_rate_limit(&self, client_key: &str) -> bool {
        let now = Instant::now();

        let mut entry = self
            .windows
            .entry(client_key.to_string())
            .or_insert(RequestWindow {
                window_start: now,
                request_count: 0,
            });

        if now.duration_since(entry.window_start) >= self.window_duration {
            entry.window_start = now;
            entry.request_count = 0;
        }

        if entry.request_count >= self.requests_per_window {
            return false;
        }

        entry.request_count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_enforced_within_a_window() {
        let limiter = RateLimiter {
            windows: Arc::new(DashMap::new()),
            requests_per_window: 3,
            window_duration: Duration::from_secs(60),
        };

        assert!(limiter.check_rate_limit("client"));
        assert!(limiter.check_rate_limit("client"));
        assert!(limiter.check_rate_limit("client"));
        assert!(!limiter.check_rate_limit("client"));

        // A different client gets its own window
        assert!(limiter.check_rate_limit("other"));
    }
}
