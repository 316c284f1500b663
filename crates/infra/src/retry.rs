//! Retry policy for the startup database connection.

use std::future::Future;
use std::time::Duration;

use crate::config::{ConfigError, parse_or};

pub const DATABASE_CONNECT_ATTEMPTS: &str = "DATABASE_CONNECT_ATTEMPTS";
pub const DATABASE_CONNECT_DELAY_SECS: &str = "DATABASE_CONNECT_DELAY_SECS";
pub const DATABASE_CONNECT_MAX_DELAY_SECS: &str = "DATABASE_CONNECT_MAX_DELAY_SECS";
pub const DATABASE_CONNECT_BACKOFF: &str = "DATABASE_CONNECT_BACKOFF";

/// Backoff strategy for retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    #[default]
    Fixed,
    /// Exponential backoff: base * 2^(attempt - 1)
    Exponential,
    /// Linear backoff: base * attempt
    Linear,
}

impl std::str::FromStr for BackoffStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "exponential" => Ok(Self::Exponential),
            "linear" => Ok(Self::Linear),
            other => Err(format!("expected fixed, exponential or linear, got `{other}`")),
        }
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts (0 = retry forever)
    pub max_attempts: u32,
    /// Base delay between attempts
    pub base_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
    /// Backoff strategy
    pub strategy: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 12,
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            strategy: BackoffStrategy::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with fixed delays.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay: delay,
            max_delay: delay,
            strategy: BackoffStrategy::Fixed,
        }
    }

    /// Create a policy with exponential backoff.
    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            strategy: BackoffStrategy::Exponential,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let max_attempts = parse_or(&lookup, DATABASE_CONNECT_ATTEMPTS, defaults.max_attempts)?;
        let base_secs = parse_or(&lookup, DATABASE_CONNECT_DELAY_SECS, defaults.base_delay.as_secs())?;
        let max_secs = parse_or(&lookup, DATABASE_CONNECT_MAX_DELAY_SECS, defaults.max_delay.as_secs())?;
        let strategy = parse_or(&lookup, DATABASE_CONNECT_BACKOFF, defaults.strategy)?;

        Ok(Self {
            max_attempts,
            base_delay: Duration::from_secs(base_secs),
            max_delay: Duration::from_secs(max_secs.max(base_secs)),
            strategy,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_attempts == 0
    }

    /// Delay to wait after the given failed attempt (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay = match self.strategy {
            BackoffStrategy::Fixed => self.base_delay,
            BackoffStrategy::Exponential => {
                let exp = 2_u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
                self.base_delay.saturating_mul(exp)
            }
            BackoffStrategy::Linear => self.base_delay.saturating_mul(attempt),
        };

        delay.min(self.max_delay)
    }

    /// Check whether another attempt is allowed after `attempt` failed ones.
    pub fn should_retry(&self, attempt: u32) -> bool {
        self.is_unbounded() || attempt < self.max_attempts
    }

    /// Run `operation` until it succeeds or the policy is exhausted.
    ///
    /// Returns the last error together with the number of attempts made.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut operation: F) -> Result<T, (u32, E)>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match operation(attempt).await {
                Ok(value) => {
                    tracing::info!(attempt, "{what} succeeded");
                    return Ok(value);
                }
                Err(e) if self.should_retry(attempt) => {
                    let delay = self.delay_for_attempt(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %e,
                        "{what} failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "{what} failed; giving up");
                    return Err((attempt, e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn default_matches_fixed_five_second_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.strategy, BackoffStrategy::Fixed);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(9), Duration::from_secs(5));
        assert!(!policy.is_unbounded());
    }

    #[test]
    fn exponential_doubles_and_caps() {
        let policy = RetryPolicy::exponential(10, Duration::from_secs(1), Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_secs(10));
    }

    #[test]
    fn zero_attempts_means_unbounded() {
        let policy = RetryPolicy::fixed(0, Duration::from_secs(5));
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(u32::MAX - 1));
    }

    #[test]
    fn bounded_policy_stops_at_max_attempts() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(1));
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let vars: HashMap<&str, &str> = [
            (DATABASE_CONNECT_ATTEMPTS, "0"),
            (DATABASE_CONNECT_DELAY_SECS, "2"),
            (DATABASE_CONNECT_MAX_DELAY_SECS, "30"),
            (DATABASE_CONNECT_BACKOFF, "linear"),
        ]
        .into_iter()
        .collect();

        let policy = RetryPolicy::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert!(policy.is_unbounded());
        assert_eq!(policy.strategy, BackoffStrategy::Linear);
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(6));
    }

    #[test]
    fn from_lookup_rejects_unknown_backoff() {
        let err = RetryPolicy::from_lookup(|k| (k == DATABASE_CONNECT_BACKOFF).then(|| "random".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: DATABASE_CONNECT_BACKOFF, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn run_retries_until_success() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::fixed(5, Duration::from_secs(5));

        let result: Result<&str, (u32, String)> = policy
            .run("connect", |_attempt| {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(format!("refused #{n}"))
                    } else {
                        Ok("connected")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("connected"));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn run_gives_up_after_max_attempts() {
        let policy = RetryPolicy::fixed(4, Duration::from_secs(5));

        let result: Result<(), (u32, String)> = policy
            .run("connect", |attempt| async move { Err(format!("refused #{attempt}")) })
            .await;

        assert_eq!(result, Err((4, "refused #4".to_string())));
    }

    proptest! {
        #[test]
        fn delay_never_exceeds_cap(
            attempt in 0u32..1000,
            base_ms in 0u64..10_000,
            cap_ms in 0u64..120_000,
            strategy in prop_oneof![
                Just(BackoffStrategy::Fixed),
                Just(BackoffStrategy::Exponential),
                Just(BackoffStrategy::Linear),
            ],
        ) {
            let policy = RetryPolicy {
                max_attempts: 10,
                base_delay: Duration::from_millis(base_ms),
                max_delay: Duration::from_millis(cap_ms),
                strategy,
            };
            prop_assert!(policy.delay_for_attempt(attempt) <= policy.max_delay);
        }
    }
}
