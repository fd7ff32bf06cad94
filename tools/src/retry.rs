//! Retry policies and timeout handling for tool execution
//!
//! Provides configurable retry policies with timeouts:
//! - No retry (fail immediately)
//! - Fixed retry (constant delay between attempts)
//! - Exponential backoff (increasing delay between attempts)
//!
//! Only `Err` results are retried. A timed-out attempt is dropped where it
//! stands, so only tools without side effects should be wrapped.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use ticket_assist_core::agent::{ToolError, ToolExecutorFn, ToolFuture, ToolResult};

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retry policy for tool execution
#[derive(Debug, Clone)]
pub enum RetryPolicy {
    /// No retry - fail immediately on error
    None,

    /// Fixed retry with constant delay
    Fixed {
        /// Number of attempts (including the initial attempt)
        attempts: u32,
        /// Delay between attempts
        delay: Duration,
    },

    /// Exponential backoff: `initial_delay * multiplier^retry`
    Exponential {
        /// Number of attempts (including the initial attempt)
        attempts: u32,
        /// Delay before the first retry
        initial_delay: Duration,
        /// Multiplier for exponential growth (typically 2.0)
        multiplier: f64,
    },
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::Fixed {
            attempts: 3,
            delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Total attempts, never less than one
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Fixed { attempts, .. } | Self::Exponential { attempts, .. } => (*attempts).max(1),
        }
    }

    /// Delay after failed attempt number `attempt` (0-based)
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay, .. } => *delay,
            Self::Exponential {
                initial_delay,
                multiplier,
                ..
            } => {
                let factor = multiplier.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
                initial_delay.mul_f64(factor)
            }
        }
    }
}

/// Tool configuration with retry policy and timeout
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Retry policy for this tool
    pub retry_policy: RetryPolicy,
    /// Maximum execution time for a single attempt
    pub timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ToolConfig {
    /// Create a config with no retry
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            retry_policy: RetryPolicy::None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a config with fixed retry
    #[must_use]
    pub const fn fixed_retry(attempts: u32, delay: Duration) -> Self {
        Self {
            retry_policy: RetryPolicy::Fixed { attempts, delay },
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a config with exponential backoff
    #[must_use]
    pub const fn exponential_backoff(attempts: u32, initial_delay: Duration) -> Self {
        Self {
            retry_policy: RetryPolicy::Exponential {
                attempts,
                initial_delay,
                multiplier: 2.0,
            },
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set timeout duration
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Execute a tool with retry policy and timeout
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use ticket_assist_tools::retry::{execute_with_retry, ToolConfig};
///
/// # tokio_test::block_on(async {
/// let config = ToolConfig::fixed_retry(3, Duration::from_millis(1));
/// let result = execute_with_retry(&config, || async { Ok("answer".to_string()) }).await;
/// assert_eq!(result.unwrap(), "answer");
/// # });
/// ```
///
/// # Errors
///
/// Returns the last attempt's `ToolError` (or a timeout error) once every
/// attempt has failed.
pub async fn execute_with_retry<F, Fut>(config: &ToolConfig, executor: F) -> ToolResult
where
    F: Fn() -> Fut,
    Fut: Future<Output = ToolResult>,
{
    let attempts = config.retry_policy.attempts();
    let mut attempt = 0;

    loop {
        let error = match tokio::time::timeout(config.timeout, executor()).await {
            Ok(Ok(result)) => return Ok(result),
            Ok(Err(e)) => e,
            Err(_) => ToolError::new(format!(
                "Tool execution timed out after {:?}",
                config.timeout
            )),
        };

        attempt += 1;
        if attempt >= attempts {
            return Err(error);
        }
        let delay = config.retry_policy.delay_after(attempt - 1);
        tracing::debug!(attempt, error = %error, ?delay, "Retrying tool");
        tokio::time::sleep(delay).await;
    }
}

/// Wrap an executor so every call runs under `config`
#[must_use]
pub fn with_retry(config: ToolConfig, executor: ToolExecutorFn) -> ToolExecutorFn {
    let config = Arc::new(config);
    Arc::new(move |input: String| {
        let config = Arc::clone(&config);
        let executor = Arc::clone(&executor);
        Box::pin(async move {
            execute_with_retry(&config, || executor(input.clone())).await
        }) as ToolFuture
    })
}
