//! Request/response logging.
//!
//! The client reports every attempt to an injected [`RequestLogger`]. Logger
//! methods return nothing, so a logger cannot change the outcome of a call or
//! the retry decision.
//!
//! [`TracingRequestLogger`] is the default implementation: it emits `tracing`
//! events tagged with the configured channel name, with the `Authorization`
//! header redacted.

use std::fmt;

use uuid::Uuid;

use crate::transport::{HttpRequest, RawResponse};

/// Placeholder written instead of secret header values.
pub const REDACTED: &str = "[REDACTED]";

/// Headers whose values are never logged.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "proxy-authorization", "cookie"];

/// Identifies one attempt of one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptContext {
    /// Correlation id shared by all attempts of a call.
    pub request_id: Uuid,
    /// Zero-based attempt number.
    pub attempt: u32,
}

/// Observer for gateway traffic.
///
/// Implementations must be cheap and must not panic; they run inline with
/// every attempt.
pub trait RequestLogger: Send + Sync + fmt::Debug {
    /// Called before an attempt is sent.
    fn on_request(&self, ctx: AttemptContext, request: &HttpRequest);

    /// Called when an attempt produced a response (any status).
    fn on_response(&self, ctx: AttemptContext, request: &HttpRequest, response: &RawResponse);

    /// Called when an attempt failed without a response.
    fn on_error(&self, ctx: AttemptContext, request: &HttpRequest, error: &dyn std::error::Error);
}

/// Returns `headers` with sensitive values replaced by [`REDACTED`].
///
/// # Examples
///
/// ```
/// use upayments::logging::{REDACTED, redact_headers};
///
/// let headers = vec![("Authorization".to_owned(), "Bearer secret".to_owned())];
/// assert_eq!(redact_headers(&headers)[0].1, REDACTED);
/// ```
#[must_use]
pub fn redact_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            if SENSITIVE_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                (name.clone(), REDACTED.to_owned())
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

/// Logs gateway traffic as `tracing` events.
#[derive(Debug, Clone)]
pub struct TracingRequestLogger {
    channel: String,
}

impl TracingRequestLogger {
    /// Creates a logger that tags every event with `channel`.
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self { channel: channel.into() }
    }

    /// Returns the channel name.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl RequestLogger for TracingRequestLogger {
    fn on_request(&self, ctx: AttemptContext, request: &HttpRequest) {
        tracing::info!(
            target: "upayments::http",
            channel = %self.channel,
            request_id = %ctx.request_id,
            attempt = ctx.attempt + 1,
            method = %request.method,
            uri = %request.url,
            headers = ?redact_headers(&request.headers),
            body = %request.body_text(),
            "Request"
        );
    }

    fn on_response(&self, ctx: AttemptContext, _request: &HttpRequest, response: &RawResponse) {
        tracing::info!(
            target: "upayments::http",
            channel = %self.channel,
            request_id = %ctx.request_id,
            attempt = ctx.attempt + 1,
            status = response.status,
            headers = ?redact_headers(&response.headers),
            body = %response.body_text(),
            "Response"
        );
    }

    fn on_error(&self, ctx: AttemptContext, request: &HttpRequest, error: &dyn std::error::Error) {
        tracing::error!(
            target: "upayments::http",
            channel = %self.channel,
            request_id = %ctx.request_id,
            attempt = ctx.attempt + 1,
            method = %request.method,
            uri = %request.url,
            error = %error,
            request_body = %request.body_text(),
            "Request Exception"
        );
    }
}
