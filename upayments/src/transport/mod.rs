//! Transport abstraction layer.
//!
//! A [`Transport`] performs exactly one HTTP exchange per call and reports
//! every completed exchange as a [`RawResponse`], whatever its status code.
//! Retry, logging and response interpretation live in
//! [`UpaymentsClient`](crate::UpaymentsClient), so a transport only has to
//! move bytes.
//!
//! # Examples
//!
//! ```rust,no_run
//! use reqwest::Method;
//! use upayments::transport::{HttpRequest, HttpTransport, Transport};
//! use url::Url;
//!
//! # async fn example() -> upayments::Result<()> {
//! let transport = HttpTransport::new()?;
//! let request = HttpRequest {
//!     method: Method::GET,
//!     url: Url::parse("https://sandboxapi.upayments.com/api/v1/check-payment-button-status")
//!         .unwrap(),
//!     headers: vec![("Accept".to_owned(), "application/json".to_owned())],
//!     body: None,
//! };
//!
//! let response = transport.send(&request).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use reqwest::Method;
use url::Url;

use crate::error::Result;

pub mod config;
pub mod http;
pub(crate) mod sealed;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// A fully resolved outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL.
    pub url: Url,
    /// Request headers, in send order.
    pub headers: Vec<(String, String)>,
    /// Serialized body; `None` sends no body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the body as UTF-8 text for logging.
    #[must_use]
    pub fn body_text(&self) -> String {
        self.body.as_deref().map(String::from_utf8_lossy).unwrap_or_default().into_owned()
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body as UTF-8 text for logging.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Single-attempt HTTP transport.
///
/// This trait is sealed; [`HttpTransport`] is the production implementation.
///
/// # Contract
///
/// - One network exchange per [`send`](Self::send) call, no internal retry
/// - Any HTTP status (including 4xx/5xx) is returned as `Ok(RawResponse)`
/// - Failures without a response are returned as
///   [`UpaymentsError::Transport`](crate::UpaymentsError::Transport) with no
///   status
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Sends `request` once.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no response was received.
    fn send<'a>(
        &'a self,
        request: &'a HttpRequest,
    ) -> impl Future<Output = Result<RawResponse>> + Send + 'a;

    /// Returns the protocol name for logging.
    ///
    /// Examples: "http/1.1", "http/2"
    fn protocol_name(&self) -> &'static str;
}
