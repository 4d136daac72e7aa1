use std::time::{Duration, Instant};

use dashmap::DashMap;

const WINDOW_SECS: u64 = 15 * 60;
const MAX_FAILURES: u32 = 5;

/// Per-email brute force limiter for the token endpoint.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if a login attempt is allowed. 5 failures per 15 minutes.
    /// Does NOT increment the counter; call `record_failure()` on invalid credentials.
    /// Returns the seconds until the window resets when blocked.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        let window = Duration::from_secs(WINDOW_SECS);
        let now = Instant::now();

        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = entry.value();

        if now.duration_since(*start) > window {
            return Ok(());
        }

        if *count >= MAX_FAILURES {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(WINDOW_SECS.saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record_failure(&self, email: &str) {
        let window = Duration::from_secs(WINDOW_SECS);
        let now = Instant::now();

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget an email after a successful login.
    pub fn reset(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Remove stale entries older than the given duration.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_five_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..MAX_FAILURES {
            assert!(limiter.check("chef@example.com").is_ok());
            limiter.record_failure("chef@example.com");
        }
        assert!(limiter.check("chef@example.com").is_err());
        // Keyed case-insensitively
        assert!(limiter.check("CHEF@example.com").is_err());
        assert!(limiter.check("other@example.com").is_ok());
    }

    #[test]
    fn reset_clears_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..MAX_FAILURES {
            limiter.record_failure("chef@example.com");
        }
        limiter.reset("chef@example.com");
        assert!(limiter.check("chef@example.com").is_ok());
    }

    #[test]
    fn cleanup_drops_old_entries() {
        let limiter = LoginRateLimiter::new();
        limiter.record_failure("chef@example.com");
        limiter.cleanup(Duration::ZERO);
        assert!(limiter.entries.is_empty());
    }
}
