//! Exponential backoff with optional full-jitter and selective retry.
//!
//! `RetryPolicy::execute` wraps a fallible closure, retrying on failure
//! according to the policy's configured profile. The five named profiles
//! below mirror the policy instances the original system shipped.

use std::time::Duration;

use rand::Rng;

#[derive(thiserror::Error, Debug)]
pub enum RetryError<E> {
    #[error("retries exhausted after {attempts} attempt(s)")]
    Exhausted { attempts: u32, source: E },

    #[error("non-retryable failure")]
    NonRetryable(#[source] E),
}

/// A predicate deciding whether a given failure is eligible for retry.
/// `None` means every failure is retryable (the default profile's behavior).
pub type RetryableFn<E> = fn(&E) -> bool;

#[derive(Debug, Clone)]
pub struct RetryPolicy<E> {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub exponential_base: f64,
    pub jitter: bool,
    pub retryable: Option<RetryableFn<E>>,
}

impl<E> RetryPolicy<E> {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(60),
            exponential_base: 2.0,
            jitter: false,
            retryable: None,
        }
    }

    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }

    pub fn with_exponential_base(mut self, b: f64) -> Self {
        self.exponential_base = b;
        self
    }

    pub fn with_jitter(mut self, j: bool) -> Self {
        self.jitter = j;
        self
    }

    pub fn with_retryable(mut self, f: RetryableFn<E>) -> Self {
        self.retryable = Some(f);
        self
    }

    /// `default` profile: 3 retries, 1s base delay.
    pub fn default_profile() -> Self {
        Self::new(3, Duration::from_secs(1))
    }

    /// `aggressive` profile: 5 retries, 0.5s base delay.
    pub fn aggressive() -> Self {
        Self::new(5, Duration::from_millis(500))
    }

    /// `conservative` profile: 2 retries, 2s base delay.
    pub fn conservative() -> Self {
        Self::new(2, Duration::from_secs(2))
    }

    /// `proxy-connection` profile: 5 retries, 0.5s base, 1.5 exponential
    /// base, 10s cap, jitter on. Retry eligibility is restricted by the
    /// caller via `with_retryable`.
    pub fn proxy_connection() -> Self {
        Self::new(5, Duration::from_millis(500))
            .with_exponential_base(1.5)
            .with_max_delay(Duration::from_secs(10))
            .with_jitter(true)
    }

    /// `connection` profile: 3 retries, 1s base, 15s cap. Retry eligibility
    /// is restricted by the caller via `with_retryable`.
    pub fn connection() -> Self {
        Self::new(3, Duration::from_secs(1)).with_max_delay(Duration::from_secs(15))
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let raw = self.base_delay.as_secs_f64() * self.exponential_base.powi(attempt as i32);
        let capped = raw.min(self.max_delay.as_secs_f64());
        let secs = if self.jitter {
            if capped <= 0.0 {
                0.0
            } else {
                rand::thread_rng().gen_range(0.0..capped)
            }
        } else {
            capped
        };
        Duration::from_secs_f64(secs)
    }

    fn is_retryable(&self, err: &E) -> bool {
        self.retryable.map(|f| f(err)).unwrap_or(true)
    }

    /// Runs `fn` synchronously, sleeping on the calling thread between
    /// retries. For async call sites use `execute_async`.
    pub fn execute<T>(&self, mut f: impl FnMut() -> Result<T, E>) -> Result<T, RetryError<E>> {
        let mut attempt = 0;
        loop {
            match f() {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if !self.is_retryable(&e) {
                        return Err(RetryError::NonRetryable(e));
                    }
                    if attempt >= self.max_retries {
                        return Err(RetryError::Exhausted {
                            attempts: attempt + 1,
                            source: e,
                        });
                    }
                    let d = self.delay_for_attempt(attempt);
                    tracing::warn!(attempt, delay_ms = d.as_millis() as u64, "retrying after failure");
                    std::thread::sleep(d);
                    attempt += 1;
                }
            }
        }
    }

    /// Async equivalent of `execute`, using `tokio::time::sleep` between
    /// retries.
    pub async fn execute_async<T, Fut>(
        &self,
        mut f: impl FnMut() -> Fut,
    ) -> Result<T, RetryError<E>>
    where
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if !self.is_retryable(&e) {
                        return Err(RetryError::NonRetryable(e));
                    }
                    if attempt >= self.max_retries {
                        return Err(RetryError::Exhausted {
                            attempts: attempt + 1,
                            source: e,
                        });
                    }
                    let d = self.delay_for_attempt(attempt);
                    tracing::warn!(attempt, delay_ms = d.as_millis() as u64, "retrying after failure");
                    tokio::time::sleep(d).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn succeeds_without_retry() {
        let policy = RetryPolicy::<()>::default_profile();
        let result: Result<i32, ()> = policy.execute(|| Ok(42));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn exhausts_after_max_retries() {
        let policy: RetryPolicy<&str> = RetryPolicy::new(2, Duration::from_millis(1));
        let calls = Cell::new(0);
        let result: Result<(), &str> = policy.execute(|| {
            calls.set(calls.get() + 1);
            Err("boom")
        });
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 3, .. })));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn non_retryable_short_circuits() {
        let policy: RetryPolicy<&str> =
            RetryPolicy::new(5, Duration::from_millis(1)).with_retryable(|_| false);
        let calls = Cell::new(0);
        let result: Result<(), &str> = policy.execute(|| {
            calls.set(calls.get() + 1);
            Err("nope")
        });
        assert!(matches!(result, Err(RetryError::NonRetryable("nope"))));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retry_math_without_jitter() {
        let policy: RetryPolicy<()> = RetryPolicy::new(5, Duration::from_millis(100))
            .with_exponential_base(2.0)
            .with_max_delay(Duration::from_secs(10));
        let d0 = policy.delay_for_attempt(0);
        let d1 = policy.delay_for_attempt(1);
        let d2 = policy.delay_for_attempt(2);
        assert_eq!(d0, Duration::from_millis(100));
        assert_eq!(d1, Duration::from_millis(200));
        assert_eq!(d2, Duration::from_millis(400));
    }

    #[test]
    fn retry_math_caps_at_max_delay() {
        let policy: RetryPolicy<()> = RetryPolicy::new(10, Duration::from_secs(1))
            .with_exponential_base(2.0)
            .with_max_delay(Duration::from_secs(5));
        let d = policy.delay_for_attempt(10);
        assert_eq!(d, Duration::from_secs(5));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy: RetryPolicy<()> = RetryPolicy::new(3, Duration::from_millis(100))
            .with_exponential_base(2.0)
            .with_jitter(true);
        for attempt in 0..3 {
            let cap = policy.base_delay.as_secs_f64() * policy.exponential_base.powi(attempt as i32);
            let d = policy.delay_for_attempt(attempt);
            assert!(d.as_secs_f64() >= 0.0 && d.as_secs_f64() < cap);
        }
    }

    #[test]
    fn named_profiles_match_spec() {
        let d = RetryPolicy::<()>::default_profile();
        assert_eq!(d.max_retries, 3);
        assert_eq!(d.base_delay, Duration::from_secs(1));

        let a = RetryPolicy::<()>::aggressive();
        assert_eq!(a.max_retries, 5);
        assert_eq!(a.base_delay, Duration::from_millis(500));

        let c = RetryPolicy::<()>::conservative();
        assert_eq!(c.max_retries, 2);
        assert_eq!(c.base_delay, Duration::from_secs(2));

        let p = RetryPolicy::<()>::proxy_connection();
        assert_eq!(p.max_retries, 5);
        assert_eq!(p.exponential_base, 1.5);
        assert_eq!(p.max_delay, Duration::from_secs(10));
        assert!(p.jitter);

        let conn = RetryPolicy::<()>::connection();
        assert_eq!(conn.max_retries, 3);
        assert_eq!(conn.max_delay, Duration::from_secs(15));
    }
}
