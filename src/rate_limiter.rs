//! # Rate Limiter Module
//!
//! Sliding-window admission control for expensive catalog operations
//! (searches and downloads). Each user keeps a short history of admitted
//! request times; the history is pruned lazily on every check, so no
//! background task is needed for correctness.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::session::UserId;

/// Per-user sliding-window rate limiter
///
/// # Behavior
///
/// - Timestamps older than the window are dropped before every decision
/// - A request is admitted while fewer than `max_requests` remain
/// - Denied attempts are not recorded, so hammering the bot does not
///   extend the wait
///
/// Histories are bounded by `max_requests`, which keeps the pruning cost
/// inside the check negligible.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    history: Mutex<HashMap<UserId, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use music_finder_bot::config::RateLimitConfig;
    /// use music_finder_bot::rate_limiter::RateLimiter;
    ///
    /// let limiter = RateLimiter::new(&RateLimitConfig::default());
    /// assert!(limiter.is_allowed(42));
    /// ```
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests.max(1),
            window: Duration::from_secs(config.window_seconds),
            history: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Admit or deny a request for `user` right now
    pub fn is_allowed(&self, user: UserId) -> bool {
        self.is_allowed_at(user, Instant::now())
    }

    /// Admit or deny a request for `user` at `now`
    ///
    /// Admitted requests are recorded; denied ones leave the history as is.
    pub fn is_allowed_at(&self, user: UserId, now: Instant) -> bool {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let requests = history.entry(user).or_default();
        Self::prune_before(requests, now, self.window);

        if requests.len() >= self.max_requests {
            return false;
        }
        requests.push_back(now);
        true
    }

    /// Time until the oldest retained request leaves the window
    pub fn get_wait_time(&self, user: UserId) -> Duration {
        self.get_wait_time_at(user, Instant::now())
    }

    /// Time at `now` until the oldest retained request leaves the window
    ///
    /// Returns zero when the user has no history inside the window.
    pub fn get_wait_time_at(&self, user: UserId, now: Instant) -> Duration {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(requests) = history.get_mut(&user) else {
            return Duration::ZERO;
        };
        Self::prune_before(requests, now, self.window);

        match requests.front() {
            Some(oldest) => (*oldest + self.window).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Drop histories that no longer hold any request inside the window
    ///
    /// Only frees memory for users who went quiet; admission decisions do
    /// not depend on it.
    pub fn prune(&self, now: Instant) -> usize {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let before = history.len();
        history.retain(|_, requests| {
            Self::prune_before(requests, now, self.window);
            !requests.is_empty()
        });
        before - history.len()
    }

    /// Number of users with a tracked history
    pub fn tracked_users(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn prune_before(requests: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = requests.front() {
            if now.saturating_duration_since(*oldest) >= window {
                requests.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: usize, window_seconds: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests,
            window_seconds,
        })
    }

    #[test]
    fn test_denied_attempt_is_not_recorded() {
        let limiter = limiter(1, 10);
        let start = Instant::now();

        assert!(limiter.is_allowed_at(1, start));
        assert!(!limiter.is_allowed_at(1, start + Duration::from_secs(5)));
        // Had the denied attempt been recorded, this would still be blocked
        assert!(limiter.is_allowed_at(1, start + Duration::from_secs(10)));
    }

    #[test]
    fn test_users_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.is_allowed_at(1, now));
        assert!(limiter.is_allowed_at(2, now));
        assert!(!limiter.is_allowed_at(1, now));
    }

    #[test]
    fn test_wait_time_without_history_is_zero() {
        let limiter = limiter(3, 60);
        assert_eq!(limiter.get_wait_time(7), Duration::ZERO);
    }

    #[test]
    fn test_prune_drops_quiet_users() {
        let limiter = limiter(2, 60);
        let start = Instant::now();
        limiter.is_allowed_at(1, start);
        limiter.is_allowed_at(2, start + Duration::from_secs(30));

        assert_eq!(limiter.prune(start + Duration::from_secs(61)), 1);
        assert_eq!(limiter.tracked_users(), 1);
    }
}
