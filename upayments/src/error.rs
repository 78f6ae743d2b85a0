//! Error types for the UPayments client.
//!
//! Every fallible operation in this crate returns [`Result<T>`]. The error type
//! keeps the three failure causes of a gateway call apart so callers can match
//! on them:
//!
//! - **Validation** ([`UpaymentsError::Validation`]): the request was rejected
//!   locally, before any network traffic
//! - **Business** ([`UpaymentsError::Api`]): the gateway answered, but reported
//!   `status: false`
//! - **Transport** ([`UpaymentsError::Transport`]): the request could not be
//!   completed, or the gateway failed at the HTTP level after retries
//!
//! Configuration problems found while building a client are reported as
//! [`UpaymentsError::Config`].
//!
//! # Examples
//!
//! ```
//! use upayments::error::{Result, UpaymentsError};
//!
//! fn require_order_id(order_id: &str) -> Result<&str> {
//!     if order_id.is_empty() {
//!         return Err(UpaymentsError::Validation("The order ID is required.".to_owned()));
//!     }
//!     Ok(order_id)
//! }
//!
//! assert!(require_order_id("").is_err());
//! ```

use serde_json::Value;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, UpaymentsError>;

/// Message used when a request fails without any response to inspect.
pub const GENERIC_TRANSPORT_MESSAGE: &str = "An error occurred while processing the request";

/// Message used when a failed response carries no `message` field.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Message used when a business rejection carries no `message` field.
pub const GENERIC_API_MESSAGE: &str = "Upayments API error";

/// Errors returned by the UPayments client.
///
/// # Error Recovery
///
/// - **Validation**: fix the input; retrying the same call cannot succeed
/// - **Api**: inspect [`api_response`](Self::api_response) for the gateway's
///   reason; the transport has already decided not to retry
/// - **Transport**: retries were exhausted; the operation may be retried later
/// - **Config**: fix the client configuration
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum UpaymentsError {
    /// A required field was missing or empty, or an enumerated field held an
    /// unsupported value.
    ///
    /// # Examples
    ///
    /// ```
    /// use upayments::error::UpaymentsError;
    ///
    /// let err = UpaymentsError::Validation("The field 'email' is required.".to_owned());
    /// assert_eq!(err.to_string(), "The field 'email' is required.");
    /// ```
    #[error("{0}")]
    Validation(String),

    /// The gateway processed the request and rejected it (`status: false`).
    #[error("{message}")]
    Api {
        /// Message reported by the gateway.
        message: String,
        /// HTTP status code of the response.
        status: u16,
        /// Decoded response body.
        response: Value,
    },

    /// The request did not complete, or completed with an HTTP failure.
    #[error("{message}")]
    Transport {
        /// Best-effort message extracted from the response body.
        message: String,
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Underlying HTTP client error, when there was one.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The client configuration is invalid.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl UpaymentsError {
    /// Creates a transport error for a request that produced no response.
    pub fn network(source: reqwest::Error) -> Self {
        Self::Transport {
            message: GENERIC_TRANSPORT_MESSAGE.to_owned(),
            status: None,
            source: Some(source),
        }
    }

    /// Returns the HTTP status code attached to this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport { status, .. } => *status,
            Self::Validation(_) | Self::Config(_) => None,
        }
    }

    /// Returns the decoded gateway response for business rejections.
    #[must_use]
    pub fn api_response(&self) -> Option<&Value> {
        match self {
            Self::Api { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns `true` if the error was raised before any network call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
