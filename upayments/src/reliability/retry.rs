//! Exponential backoff retry logic for transient failures.
//!
//! This module provides retry functionality with exponential backoff for
//! network errors and temporary gateway unavailability. The retry decision is
//! a function of the number of retries already made and the outcome of the
//! last attempt; nothing is carried over between calls.

use std::time::Duration;

use serde::Deserialize;

use crate::UpaymentsError;

/// Configuration for retry behavior.
///
/// `max_retries` counts *additional* attempts: the default of 3 allows 4
/// tries in total.
///
/// # Examples
///
/// ```
/// use upayments::reliability::RetryPolicy;
///
/// // Default policy: 3 retries, 100ms initial delay, 5s max delay
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_retries, 3);
///
/// // Immediate retries, useful against a local gateway double
/// let immediate = RetryPolicy::immediate(3);
/// assert_eq!(immediate.initial_delay_ms, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (default: 3)
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds (default: 100)
    pub initial_delay_ms: u64,
    /// Upper bound for any single delay in milliseconds (default: 5000)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff (default: 2.0)
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, initial_delay_ms: 100, max_delay_ms: 5_000, backoff_multiplier: 2.0 }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy with a custom retry ceiling.
    ///
    /// # Examples
    ///
    /// ```
    /// use upayments::reliability::RetryPolicy;
    ///
    /// let policy = RetryPolicy::with_max_retries(5);
    /// assert_eq!(policy.max_retries, 5);
    /// ```
    #[must_use]
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self { max_retries, ..Self::default() }
    }

    /// Creates a policy that retries without sleeping.
    #[must_use]
    pub fn immediate(max_retries: u32) -> Self {
        Self { max_retries, initial_delay_ms: 0, max_delay_ms: 0, ..Self::default() }
    }

    /// Creates a policy that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self::immediate(0)
    }

    /// Calculates the delay before retry number `retry` (zero based).
    ///
    /// Uses exponential backoff: delay = `initial_delay` * (multiplier ^ retry)
    /// Capped at `max_delay` to prevent excessive waits.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        #[allow(clippy::cast_precision_loss, reason = "acceptable for duration calculations")]
        let delay_ms = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "delay_ms is clamped to [0, max_delay_ms] before the cast"
        )]
        #[allow(clippy::cast_precision_loss, reason = "acceptable for duration calculations")]
        let delay_ms = delay_ms.clamp(0.0, self.max_delay_ms as f64) as u64;
        Duration::from_millis(delay_ms)
    }

    /// Returns `true` if another attempt may be made after `retries` retries.
    #[must_use]
    pub fn allows_retry(&self, retries: u32) -> bool {
        retries < self.max_retries
    }
}

/// Executes `operation` with exponential backoff retry.
///
/// `operation` receives the zero-based attempt number. After each attempt
/// `should_retry` inspects the outcome; the operation is repeated while it
/// returns `true` and the policy's retry ceiling is not reached. The outcome
/// of the last attempt is returned as-is, so a retried `Ok` value (such as a
/// 5xx response) reaches the caller when retries run out.
///
/// # Examples
///
/// ```
/// use std::sync::{
///     Arc,
///     atomic::{AtomicU32, Ordering},
/// };
///
/// use upayments::reliability::{RetryPolicy, retry_with_backoff};
///
/// # async fn example() -> Result<String, String> {
/// let policy = RetryPolicy::immediate(3);
/// let calls = Arc::new(AtomicU32::new(0));
///
/// let result = retry_with_backoff(
///     &policy,
///     |_attempt| {
///         let calls = Arc::clone(&calls);
///         async move {
///             if calls.fetch_add(1, Ordering::Relaxed) < 2 {
///                 Err("temporary failure".to_owned())
///             } else {
///                 Ok("success".to_owned())
///             }
///         }
///     },
///     |outcome| outcome.is_err(),
/// )
/// .await?;
///
/// assert_eq!(result, "success");
/// # Ok(result)
/// # }
/// ```
///
/// # Errors
///
/// Returns the error of the last attempt when retries are exhausted or
/// `should_retry` declines.
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&Result<T, E>) -> bool,
{
    let mut retries = 0;

    loop {
        let outcome = operation(retries).await;

        if !should_retry(&outcome) {
            if retries > 0 {
                tracing::info!(attempt = retries + 1, "Operation settled after retry");
            }
            return outcome;
        }

        if !policy.allows_retry(retries) {
            tracing::warn!(
                attempts = retries + 1,
                max_retries = policy.max_retries,
                "Retries exhausted"
            );
            return outcome;
        }

        let delay = policy.delay_for_retry(retries);
        tracing::warn!(
            attempt = retries + 1,
            max_retries = policy.max_retries,
            delay_ms = delay.as_millis(),
            "Transient failure, retrying"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        retries += 1;
    }
}

/// Returns `true` for HTTP statuses worth retrying (5xx).
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    status >= 500
}

/// Determines if an error is retryable.
///
/// Only transport failures qualify: those without any response (connection
/// refused, DNS, timeout) and those carrying a 5xx status. Validation and
/// business errors are final.
///
/// # Examples
///
/// ```
/// use upayments::{UpaymentsError, reliability::is_retryable};
///
/// let error = UpaymentsError::Validation("The field 'id' is required.".to_owned());
/// assert!(!is_retryable(&error));
/// ```
#[must_use]
pub fn is_retryable(error: &UpaymentsError) -> bool {
    match error {
        UpaymentsError::Transport { status, .. } => status.is_none_or(is_retryable_status),
        UpaymentsError::Validation(_) | UpaymentsError::Api { .. } | UpaymentsError::Config(_) => {
            false
        }
    }
}
