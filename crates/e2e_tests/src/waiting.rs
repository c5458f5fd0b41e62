//! Generic exponential-backoff polling, trimmed from Kubernetes-specific
//! readiness waiters down to the reusable core: repeatedly evaluate an
//! async condition until it resolves or the attempt budget is spent.

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, info, warn};

const MAX_BACKOFF: Duration = Duration::from_secs(15);
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const BACKOFF_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_BACKOFF,
            max_delay: MAX_BACKOFF,
            multiplier: BACKOFF_MULTIPLIER,
            max_attempts: 30,
        }
    }
}

impl BackoffConfig {
    pub fn fast() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            multiplier: 1.5,
            max_attempts: 20,
        }
    }
}

pub struct SmartWaiter {
    config: BackoffConfig,
    context: String,
}

impl SmartWaiter {
    pub fn new(context: &str) -> Self {
        Self { config: BackoffConfig::default(), context: context.to_string() }
    }

    pub fn with_config(context: &str, config: BackoffConfig) -> Self {
        Self { config, context: context.to_string() }
    }

    /// Poll `condition` until it returns `Ok(Some(value))`, an attempt
    /// budget is exhausted, or it returns `Err`.
    pub async fn wait_for<F, Fut, T>(&self, mut condition: F) -> Result<T, String>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Option<T>, String>>,
    {
        let start = Instant::now();
        let mut delay = self.config.initial_delay;

        for attempt in 1..=self.config.max_attempts {
            debug!(context = self.context, attempt, "polling");
            match condition().await {
                Ok(Some(value)) => {
                    info!(
                        context = self.context,
                        attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "condition satisfied"
                    );
                    return Ok(value);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(context = self.context, attempt, error = %err, "poll attempt failed");
                }
            }

            if attempt == self.config.max_attempts {
                break;
            }
            sleep(delay).await;
            delay = Duration::from_secs_f64((delay.as_secs_f64() * self.config.multiplier).min(self.config.max_delay.as_secs_f64()));
        }

        Err(format!(
            "{}: condition not satisfied after {} attempts ({:?} elapsed)",
            self.context,
            self.config.max_attempts,
            start.elapsed()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn resolves_once_condition_returns_some() {
        let attempts = AtomicU32::new(0);
        let waiter = SmartWaiter::with_config("test", BackoffConfig::fast());
        let result = waiter
            .wait_for(|| async {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Ok(None)
                } else {
                    Ok(Some(n))
                }
            })
            .await;
        assert_eq!(result, Ok(2));
    }

    #[tokio::test]
    async fn exhausts_attempt_budget_and_returns_err() {
        let waiter = SmartWaiter::with_config(
            "test",
            BackoffConfig { initial_delay: Duration::from_millis(1), max_delay: Duration::from_millis(1), multiplier: 1.0, max_attempts: 3 },
        );
        let result: Result<(), String> = waiter.wait_for(|| async { Ok(None) }).await;
        assert!(result.is_err());
    }
}
