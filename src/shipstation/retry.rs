//! Bounded retry with linear backoff
//!
//! Attempt `n` (1-based) waits `n * step` before it is sent. Only transient
//! failures (see [`ApiError::is_transient`]) are retried; anything else, or
//! the last transient failure once retries run out, goes back to the caller.
//!
//! Retries are not idempotency-aware: a POST that reached the server but
//! whose response was lost is sent again.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use super::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub step: Duration,
}

impl RetryPolicy {
    pub fn linear(max_retries: u32, step: Duration) -> Self {
        Self { max_retries, step }
    }

    pub fn none() -> Self {
        Self::linear(0, Duration::ZERO)
    }

    /// Delay before retry attempt `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.step * attempt
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_retries && e.is_transient() => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed ({}), retry attempt: {} in {:?}",
                        label, e, attempt, delay
                    );
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::linear(3, Duration::from_millis(2000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn unavailable() -> ApiError {
        ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "busy".to_string(),
        }
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_third_attempt_after_two_backoffs() {
        let policy = RetryPolicy::default();
        let attempts = Mutex::new(Vec::new());

        let result = policy
            .run("GET /warehouses", || {
                let mut seen = attempts.lock().unwrap();
                seen.push(Instant::now());
                let n = seen.len();
                async move {
                    if n < 3 {
                        Err(unavailable())
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        let seen = attempts.into_inner().unwrap();
        assert_eq!(seen.len(), 3);
        let delays: Vec<Duration> = seen.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            delays,
            vec![Duration::from_millis(2000), Duration::from_millis(4000)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let policy = RetryPolicy::default();
        let calls = Mutex::new(0u32);

        let result: Result<(), _> = policy
            .run("POST /orders/createorders", || {
                *calls.lock().unwrap() += 1;
                async { Err(unavailable()) }
            })
            .await;

        assert!(matches!(result, Err(ApiError::Status { .. })));
        assert_eq!(*calls.lock().unwrap(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let policy = RetryPolicy::default();
        let calls = Mutex::new(0u32);

        let result: Result<(), _> = policy
            .run("GET /users", || {
                *calls.lock().unwrap() += 1;
                async {
                    Err(ApiError::Status {
                        status: StatusCode::UNAUTHORIZED,
                        body: String::new(),
                    })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
