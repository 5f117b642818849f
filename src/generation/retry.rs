use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{Generation, GenerationBackend, GenerationError};
use crate::config::GenerationConfig;

/// Policy controlling how many times a failed generation is retried and the
/// delay between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of additional attempts after the first failure.
    pub max_retries: usize,
    /// Delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    #[must_use]
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Execute `op`, retrying while it fails with a transient error.
    pub async fn retry<F, Fut, T>(&self, mut op: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, GenerationError>>,
    {
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_transient() && attempts < self.max_retries => {
                    attempts += 1;
                    warn!(
                        "generation attempt {attempts}/{} failed: {e}; retrying",
                        self.max_retries + 1
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Wrapper around a [`GenerationBackend`] that applies a [`RetryPolicy`].
pub struct RetryBackend<B> {
    inner: B,
    policy: RetryPolicy,
}

impl<B> RetryBackend<B> {
    pub fn new(inner: B, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<B> GenerationBackend for RetryBackend<B>
where
    B: GenerationBackend,
{
    async fn generate(&self, system: &str, user: &str) -> Result<Generation, GenerationError> {
        self.policy
            .retry(|| self.inner.generate(system, user))
            .await
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn endpoint(&self) -> Option<String> {
        self.inner.endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::TokenUsage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with `error` for the first `failures` calls, then succeeds.
    struct Flaky {
        failures: usize,
        error: GenerationError,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerationBackend for Flaky {
        async fn generate(&self, _: &str, _: &str) -> Result<Generation, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(self.error.clone())
            } else {
                Ok(Generation {
                    text: "ok".into(),
                    usage: TokenUsage::default(),
                })
            }
        }

        fn model_id(&self) -> &str {
            "flaky"
        }
    }

    fn flaky(failures: usize, error: GenerationError) -> Flaky {
        Flaky {
            failures,
            error,
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let backend = RetryBackend::new(
            flaky(2, GenerationError::Transport("refused".into())),
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        let out = backend.generate("s", "u").await.unwrap();
        assert_eq!(out.text, "ok");
        assert_eq!(backend.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let backend = RetryBackend::new(
            flaky(5, GenerationError::Transport("refused".into())),
            RetryPolicy::new(2, Duration::from_millis(1)),
        );
        let err = backend.generate("s", "u").await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        assert_eq!(backend.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retry_on_permanent_error() {
        let backend = RetryBackend::new(
            flaky(
                1,
                GenerationError::Status {
                    status: 404,
                    message: "no such model".into(),
                },
            ),
            RetryPolicy::new(3, Duration::from_millis(1)),
        );
        assert!(backend.generate("s", "u").await.is_err());
        assert_eq!(backend.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_is_single_attempt() {
        let backend = RetryBackend::new(
            flaky(1, GenerationError::Transport("timeout".into())),
            RetryPolicy::new(0, Duration::from_millis(1)),
        );
        assert!(backend.generate("s", "u").await.is_err());
        assert_eq!(backend.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(backend.model_id(), "flaky");
    }

    #[test]
    fn test_policy_from_config() {
        let config = GenerationConfig {
            max_retries: 2,
            retry_delay_ms: 250,
            ..Default::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy, RetryPolicy::new(2, Duration::from_millis(250)));
    }
}
