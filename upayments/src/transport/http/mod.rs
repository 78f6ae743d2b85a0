//! HTTP transport implementation.
//!
//! This module provides HTTP/1.1 and HTTP/2 transport using reqwest. The
//! underlying `reqwest::Client` keeps a connection pool and is reused across
//! calls.

use reqwest::Client;
use tracing::instrument;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{Result, UpaymentsError},
    transport::{HttpRequest, RawResponse, Transport, sealed},
};

/// Validates header name and value for CRLF injection prevention.
fn validate_header(name: &str, value: &str) -> Result<()> {
    if name.contains(['\r', '\n', '\0']) {
        return Err(UpaymentsError::Validation(
            "Invalid header name: control characters not allowed".to_owned(),
        ));
    }
    if value.contains(['\r', '\n', '\0']) {
        return Err(UpaymentsError::Validation(
            "Invalid header value: control characters not allowed".to_owned(),
        ));
    }
    Ok(())
}

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// # Examples
///
/// ```
/// use upayments::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { timeout_secs: 60, http_version: HttpVersion::Http1, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a new HTTP transport with default settings.
    ///
    /// Default configuration:
    /// - Pool max idle per host: 10
    /// - Timeout: 30 seconds
    /// - Connect timeout: 10 seconds
    /// - HTTP version: Auto (prefer HTTP/2)
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default())
    }

    /// Creates HTTP transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client creation fails.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build().map_err(|e| {
            UpaymentsError::Config(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self { client, http_version: config.http_version })
    }

    /// Wraps an existing reqwest client, sharing its connection pool.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client, http_version: HttpVersion::Auto }
    }

    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: &HttpRequest) -> Result<RawResponse> {
        for (name, value) in &request.headers {
            validate_header(name, value)?;
        }

        let mut builder = self.client.request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(UpaymentsError::network)?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        let body = response.bytes().await.map_err(UpaymentsError::network)?.to_vec();

        Ok(RawResponse { status, headers, body })
    }
}

impl Transport for HttpTransport {
    async fn send<'a>(&'a self, request: &'a HttpRequest) -> Result<RawResponse> {
        self.execute(request).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
