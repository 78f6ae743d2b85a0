//! Client configuration.
//!
//! A [`ClientConfig`] can be built in code, deserialized from TOML, or read
//! from `UPAYMENTS_*` environment variables:
//!
//! | Variable | Default |
//! |---|---|
//! | `UPAYMENTS_API_KEY` | required |
//! | `UPAYMENTS_API_URL` | `https://sandboxapi.upayments.com` |
//! | `UPAYMENTS_LOGGING_CHANNEL` | `stack` |
//! | `UPAYMENTS_LOGGING_ENABLED` | `true` |
//! | `UPAYMENTS_PROFILE` | `standard` |
//! | `UPAYMENTS_TIMEOUT_SECS` | `30` |

use std::{fmt, path::Path};

use serde::Deserialize;
use url::{Host, Url};
use zeroize::Zeroize;

use crate::{
    endpoint::EndpointConfig,
    error::{Result, UpaymentsError},
    profile::{ApiProfile, ProfileName},
    reliability::RetryPolicy,
    transport::HttpConfig,
    validation::RequiredFieldPolicy,
};

/// Sandbox gateway used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://sandboxapi.upayments.com";

/// Log channel used when none is configured.
pub const DEFAULT_LOG_CHANNEL: &str = "stack";

/// Merchant API key.
///
/// The key never appears in `Debug` output and is wiped from memory on drop.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn validate(&self) -> Result<()> {
        if self.0.trim().is_empty() {
            return Err(UpaymentsError::Config("api_key must not be empty".to_owned()));
        }
        if self.0.chars().any(char::is_control) {
            return Err(UpaymentsError::Config(
                "api_key must not contain control characters".to_owned(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Request/response logging settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether gateway traffic is logged.
    pub enabled: bool,
    /// Channel name attached to every log event.
    pub channel: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true, channel: DEFAULT_LOG_CHANNEL.to_owned() }
    }
}

/// Complete client configuration.
///
/// # Examples
///
/// ```
/// use upayments::config::ClientConfig;
///
/// let toml = r#"
///     api_key = "e66a94d579cf75fba327ff716ad68c53aae11528"
///     base_url = "https://sandboxapi.upayments.com"
///     profile = "standard"
///
///     [retry]
///     max_retries = 2
///
///     [logging]
///     channel = "payments"
/// "#;
///
/// let config = ClientConfig::from_toml(toml).unwrap();
/// assert_eq!(config.retry.max_retries, 2);
/// assert_eq!(config.logging.channel, "payments");
/// assert!(config.logging.enabled);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Merchant API key, sent as a bearer token.
    pub api_key: ApiKey,

    /// Gateway base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Built-in validation profile.
    #[serde(default)]
    pub profile: ProfileName,

    /// Overrides the profile's emptiness rule.
    #[serde(default)]
    pub field_policy: Option<RequiredFieldPolicy>,

    /// Overrides the profile's API prefix.
    #[serde(default)]
    pub api_prefix: Option<String>,

    /// Per-operation path overrides.
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Retry settings.
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

impl ClientConfig {
    /// Creates a configuration with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: ApiKey::new(api_key),
            base_url: default_base_url(),
            profile: ProfileName::default(),
            field_policy: None,
            api_prefix: None,
            endpoints: EndpointConfig::default(),
            http: HttpConfig::default(),
            retry: RetryPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Sets the gateway base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Selects a built-in profile.
    #[must_use]
    pub fn with_profile(mut self, profile: ProfileName) -> Self {
        self.profile = profile;
        self
    }

    /// Overrides the profile's emptiness rule.
    #[must_use]
    pub fn with_field_policy(mut self, policy: RequiredFieldPolicy) -> Self {
        self.field_policy = Some(policy);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the HTTP transport settings.
    #[must_use]
    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Enables or disables request logging.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool, channel: impl Into<String>) -> Self {
        self.logging = LoggingConfig { enabled, channel: channel.into() };
        self
    }

    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] if `UPAYMENTS_API_KEY` is unset or a
    /// variable holds an unparseable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup` instead of the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("UPAYMENTS_API_KEY")
            .ok_or_else(|| UpaymentsError::Config("UPAYMENTS_API_KEY is not set".to_owned()))?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup("UPAYMENTS_API_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = url;
        }
        if let Some(channel) = lookup("UPAYMENTS_LOGGING_CHANNEL").filter(|v| !v.trim().is_empty())
        {
            config.logging.channel = channel;
        }
        if let Some(enabled) = lookup("UPAYMENTS_LOGGING_ENABLED") {
            config.logging.enabled = parse_flag("UPAYMENTS_LOGGING_ENABLED", &enabled)?;
        }
        if let Some(profile) = lookup("UPAYMENTS_PROFILE").filter(|v| !v.trim().is_empty()) {
            config.profile = profile.parse()?;
        }
        if let Some(timeout) = lookup("UPAYMENTS_TIMEOUT_SECS") {
            config.http.timeout_secs = timeout.trim().parse().map_err(|e| {
                UpaymentsError::Config(format!("UPAYMENTS_TIMEOUT_SECS '{timeout}': {e}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] on parse or validation failure.
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml)
            .map_err(|e| UpaymentsError::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] if the file cannot be read or is
    /// invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            UpaymentsError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - API key is non-empty and free of control characters
    /// - base URL is an absolute `https` URL with a host; plain `http` only
    ///   for loopback hosts
    /// - API prefix and endpoint overrides are safe paths
    /// - HTTP timeouts are within bounds
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.api_key.validate()?;
        self.base_url()?;
        if let Some(prefix) = self.api_prefix.as_deref()
            && !prefix.is_empty()
        {
            crate::endpoint::validate_endpoint_path("api_prefix", prefix)?;
        }
        self.endpoints.validate()?;
        self.http.validate()?;
        Ok(())
    }

    /// Parses the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] if the URL is malformed, not
    /// `https`, or plain `http` to a non-loopback host.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            UpaymentsError::Config(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(UpaymentsError::Config(format!(
                "base_url must use http or https, got: {}",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) || url.cannot_be_a_base() {
            return Err(UpaymentsError::Config(format!(
                "base_url must include a host: {}",
                self.base_url
            )));
        }
        if url.scheme() == "http" && !is_loopback(&url) {
            return Err(UpaymentsError::Config(format!(
                "base_url must use https for non-loopback hosts: {}",
                self.base_url
            )));
        }

        Ok(url)
    }

    /// Returns the effective profile, with configured overrides applied.
    #[must_use]
    pub fn api_profile(&self) -> ApiProfile {
        let mut profile = ApiProfile::from_name(self.profile);
        if let Some(policy) = self.field_policy {
            profile.field_policy = policy;
        }
        if let Some(prefix) = &self.api_prefix {
            profile.api_prefix.clone_from(prefix);
        }
        profile
    }
}

/// `localhost`, `127.0.0.0/8` or `::1`.
fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(UpaymentsError::Config(format!("{name} must be a boolean, got '{other}'"))),
    }
}
