// src/rate_limit.rs
use crate::db::connection::Database;
use crate::db::rate_limits;
use crate::errors::ServerError;
use chrono::{DateTime, Utc};

/// Fixed-window write limiter. Counters live in the database, so every
/// worker and every process on the same file shares them.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    max: i64,
    window_ms: i64,
}

impl RateLimiter {
    pub fn new(max: i64, window_secs: i64) -> Self {
        Self {
            max,
            window_ms: window_secs.max(1) * 1000,
        }
    }

    fn window_start(&self, now: DateTime<Utc>) -> i64 {
        let ms = now.timestamp_millis();
        ms - ms.rem_euclid(self.window_ms)
    }

    /// Counts one write for `user_id`; past the limit it is `TooManyRequests`.
    pub fn check(&self, db: &Database, user_id: i64, now: DateTime<Utc>) -> Result<(), ServerError> {
        let start = self.window_start(now);
        let count = db.with_conn(|conn| {
            // Older windows can never match again.
            rate_limits::prune(conn, start)?;
            rate_limits::hit(conn, user_id, start)
        })?;

        if count > self.max {
            tracing::warn!(user_id, count, max = self.max, "rate limit exceeded");
            return Err(ServerError::TooManyRequests);
        }
        Ok(())
    }
}
