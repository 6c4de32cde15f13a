use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};

use crate::clock::Clock;
use crate::error::FetchError;

#[derive(Debug, Clone, Copy)]
struct Budget {
    remaining: u32,
    reset_at: DateTime<Utc>,
}

/// Client-side view of a remote API's call budget.
///
/// Once the budget is spent, calls fail fast until `reset_at` passes instead
/// of sending requests the server would reject.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    budget: Mutex<Budget>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let reset_at = clock.now() + window;
        Self {
            limit,
            window,
            clock,
            budget: Mutex::new(Budget {
                remaining: limit,
                reset_at,
            }),
        }
    }

    /// Spends one call, or reports when the budget refills.
    pub fn acquire(&self) -> Result<(), FetchError> {
        let now = self.clock.now();
        let mut budget = self.budget.lock().unwrap_or_else(PoisonError::into_inner);
        if now >= budget.reset_at {
            budget.remaining = self.limit;
            budget.reset_at = now + self.window;
        }
        if budget.remaining == 0 {
            tracing::debug!(target: "pagestate.adapter", reset_at = %budget.reset_at, "rate limit exhausted");
            return Err(FetchError::RateLimited {
                reset_at: budget.reset_at,
            });
        }
        budget.remaining -= 1;
        Ok(())
    }

    /// Adopts the server's view of the budget when it advertises one.
    pub fn observe(&self, remaining: Option<u32>, reset_at: Option<DateTime<Utc>>) {
        let mut budget = self.budget.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(remaining) = remaining {
            budget.remaining = remaining.min(self.limit);
        }
        if let Some(reset_at) = reset_at {
            budget.reset_at = reset_at;
        }
    }

    pub fn remaining(&self) -> u32 {
        self.budget
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remaining
    }

    pub fn reset_at(&self) -> DateTime<Utc> {
        self.budget
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(limit: u32) -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let limiter = RateLimiter::new(limit, Duration::seconds(60), clock.clone());
        (clock, limiter)
    }

    #[test]
    fn fails_fast_when_exhausted() {
        let (_, limiter) = limiter(2);
        limiter.acquire().unwrap();
        limiter.acquire().unwrap();
        let err = limiter.acquire().unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { reset_at } if reset_at == limiter.reset_at()));
        assert_eq!(limiter.remaining(), 0);
    }

    #[test]
    fn refills_after_reset() {
        let (clock, limiter) = limiter(1);
        limiter.acquire().unwrap();
        assert!(limiter.acquire().is_err());
        clock.advance(Duration::seconds(61));
        limiter.acquire().unwrap();
    }

    #[test]
    fn server_headers_override_local_count() {
        let (clock, limiter) = limiter(10);
        let reset = clock.now() + Duration::seconds(5);
        limiter.observe(Some(0), Some(reset));
        assert!(limiter.acquire().is_err());
        clock.advance(Duration::seconds(6));
        assert!(limiter.acquire().is_ok());
        assert_eq!(limiter.remaining(), 9);
    }
}
