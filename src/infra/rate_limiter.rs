//! Redis-backed fixed-window rate limiter.

use redis::{aio::ConnectionManager, Client, Pipeline, RedisError};

use crate::config::RATE_LIMIT_KEY_PREFIX;
use crate::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct RateLimiter {
    connection: ConnectionManager,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis rate limiter connected");

        Ok(Self {
            connection,
            trust_proxy_headers: false,
        })
    }

    /// Identify clients by proxy headers instead of the peer address.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    pub fn trusts_proxy_headers(&self) -> bool {
        self.trust_proxy_headers
    }

    /// Count one request against `identifier`.
    ///
    /// Returns the request count in the current window and whether it is within
    /// `max_requests`. The window starts on the first request.
    pub async fn check(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", RATE_LIMIT_KEY_PREFIX, identifier);
        let mut conn = self.connection.clone();

        let (count,): (u64,) = window_pipeline(&key, window_seconds)
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;

        Ok((count, count <= max_requests))
    }

    /// Round-trip a PING for health checks.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(())
    }
}

/// `SET key 0 NX EX window` then `INCR key` in one MULTI/EXEC. The counter
/// always carries a TTL and INCR keeps it.
fn window_pipeline(key: &str, window_seconds: u64) -> Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0u64)
        .arg("NX")
        .arg("EX")
        .arg(window_seconds.max(1))
        .ignore()
        .incr(key, 1u64);
    pipe
}

fn redis_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Rate limiter error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(pipe: &Pipeline) -> String {
        String::from_utf8_lossy(&pipe.get_packed_pipeline()).into_owned()
    }

    #[test]
    fn test_window_set_and_incr_run_in_one_transaction() {
        let commands = packed(&window_pipeline("rate_limit:auth:/users/signin:1.2.3.4", 60));

        let multi = commands.find("MULTI").unwrap();
        let set = commands.find("SET").unwrap();
        let incr = commands.find("INCR").unwrap();
        let exec = commands.find("EXEC").unwrap();
        assert!(multi < set && set < incr && incr < exec);
        assert!(commands.contains("NX"));
        assert!(commands.contains("EX\r\n$2\r\n60"));
    }

    #[test]
    fn test_zero_window_still_expires() {
        let commands = packed(&window_pipeline("k", 0));
        assert!(commands.contains("EX\r\n$1\r\n1"));
    }
}
