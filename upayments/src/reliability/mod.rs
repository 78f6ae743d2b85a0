//! Reliability patterns for gateway calls.
//!
//! Provides bounded retry with exponential backoff for transient failures:
//! network errors and 5xx responses.

mod retry;

pub use retry::{RetryPolicy, is_retryable, is_retryable_status, retry_with_backoff};
