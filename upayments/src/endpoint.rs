//! Endpoint table and path resolution.
//!
//! Every remote operation maps to a fixed path. Paths are built from the
//! active profile's API prefix unless overridden in [`EndpointConfig`], and
//! resolved once when the client is constructed.

use std::{collections::BTreeMap, fmt};

use serde::Deserialize;
use url::{Url, form_urlencoded};

use crate::error::{Result, UpaymentsError};

/// Remote gateway operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// Create a charge and obtain a payment link.
    CreatePayment,
    /// Look up a payment by track id or invoice id.
    GetPaymentStatus,
    /// Issue a refund for an order.
    CreateRefund,
    /// Check the refund state of an order.
    GetRefundStatus,
    /// Check the state of a single refund.
    CheckSingleRefundStatus,
    /// Cancel a pending refund.
    DeleteRefund,
    /// Issue a refund split across vendors.
    CreateMultiVendorRefund,
    /// Cancel a pending multi-vendor refund.
    DeleteMultiVendorRefund,
    /// Register a customer token for card storage.
    CreateCustomerToken,
    /// Start the add-card flow for a customer.
    AddCard,
    /// List the stored cards of a customer.
    RetrieveCustomerCards,
    /// List which payment buttons are enabled for the merchant.
    CheckPaymentButtonStatus,
}

impl Operation {
    /// All operations, in endpoint table order.
    pub const ALL: [Self; 12] = [
        Self::CreatePayment,
        Self::GetPaymentStatus,
        Self::CreateRefund,
        Self::GetRefundStatus,
        Self::CheckSingleRefundStatus,
        Self::DeleteRefund,
        Self::CreateMultiVendorRefund,
        Self::DeleteMultiVendorRefund,
        Self::CreateCustomerToken,
        Self::AddCard,
        Self::RetrieveCustomerCards,
        Self::CheckPaymentButtonStatus,
    ];

    /// Path relative to the API prefix.
    #[must_use]
    pub fn default_path(self) -> &'static str {
        match self {
            Self::CreatePayment => "/charge",
            Self::GetPaymentStatus => "/get-payment-status",
            Self::CreateRefund => "/create-refund",
            Self::GetRefundStatus => "/check-refund",
            Self::CheckSingleRefundStatus => "/check-refund-status",
            Self::DeleteRefund => "/delete-refund",
            Self::CreateMultiVendorRefund => "/create-multivendor-refund",
            Self::DeleteMultiVendorRefund => "/delete-multivendor-refund",
            Self::CreateCustomerToken => "/create-customer-unique-token",
            Self::AddCard => "/add-card",
            Self::RetrieveCustomerCards => "/retrieve-customer-cards",
            Self::CheckPaymentButtonStatus => "/check-payment-button-status",
        }
    }

    /// Configuration key for overriding this operation's path.
    #[must_use]
    pub fn config_key(self) -> &'static str {
        match self {
            Self::CreatePayment => "charge",
            Self::GetPaymentStatus => "get_payment_status",
            Self::CreateRefund => "create_refund",
            Self::GetRefundStatus => "check_refund",
            Self::CheckSingleRefundStatus => "check_refund_status",
            Self::DeleteRefund => "delete_refund",
            Self::CreateMultiVendorRefund => "create_multivendor_refund",
            Self::DeleteMultiVendorRefund => "delete_multivendor_refund",
            Self::CreateCustomerToken => "create_customer_unique_token",
            Self::AddCard => "add_card",
            Self::RetrieveCustomerCards => "retrieve_customer_cards",
            Self::CheckPaymentButtonStatus => "check_payment_button_status",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// How [`get_payment_status`](crate::UpaymentsClient::get_payment_status)
/// identifies the payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentLookup {
    /// Gateway track id, sent as a path segment.
    #[default]
    TrackId,
    /// Invoice id, sent as the `invoice_id` query parameter.
    InvoiceId,
}

impl PaymentLookup {
    /// Parses a caller-supplied lookup type.
    ///
    /// Only the exact value `trackId` selects a track id lookup; anything else
    /// is an invoice lookup.
    #[must_use]
    pub fn from_type(lookup_type: &str) -> Self {
        if lookup_type == "trackId" { Self::TrackId } else { Self::InvoiceId }
    }
}

/// Per-operation path overrides.
///
/// Keys are the [`Operation::config_key`] names. An override is used verbatim;
/// the profile prefix is not applied to it.
///
/// ```toml
/// [endpoints]
/// charge = "/api/v2/charge"
/// get_payment_status = "/api/v2/get-payment-status"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct EndpointConfig {
    overrides: BTreeMap<String, String>,
}

impl EndpointConfig {
    /// Sets the path for one operation.
    #[must_use]
    pub fn with_override(mut self, operation: Operation, path: impl Into<String>) -> Self {
        self.overrides.insert(operation.config_key().to_owned(), path.into());
        self
    }

    /// Returns the override for `operation`, if configured.
    #[must_use]
    pub fn get(&self, operation: Operation) -> Option<&str> {
        self.overrides.get(operation.config_key()).map(String::as_str)
    }

    /// Validates override keys and paths.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] for unknown operation keys or unsafe
    /// paths.
    pub fn validate(&self) -> Result<()> {
        for (key, path) in &self.overrides {
            if !Operation::ALL.iter().any(|op| op.config_key() == key) {
                return Err(UpaymentsError::Config(format!("unknown endpoint '{key}'")));
            }
            validate_endpoint_path(key, path)?;
        }
        Ok(())
    }
}

/// Validates an endpoint path for traversal and shape.
pub(crate) fn validate_endpoint_path(name: &str, path: &str) -> Result<()> {
    if path.contains("..") {
        return Err(UpaymentsError::Config(format!(
            "endpoint '{name}' contains path traversal sequence '..': {path}"
        )));
    }

    if path.contains("//") {
        return Err(UpaymentsError::Config(format!(
            "endpoint '{name}' contains double slash '//': {path}"
        )));
    }

    if path.contains(['?', '#']) {
        return Err(UpaymentsError::Config(format!(
            "endpoint '{name}' must not contain a query or fragment: {path}"
        )));
    }

    if !path.starts_with('/') {
        return Err(UpaymentsError::Config(format!("endpoint '{name}' must start with '/': {path}")));
    }

    Ok(())
}

/// Resolved endpoint table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTable {
    paths: BTreeMap<Operation, String>,
}

impl EndpointTable {
    /// Resolves all operations against `api_prefix` and `overrides`.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] if the prefix or an override is not
    /// a valid endpoint path.
    pub fn new(api_prefix: &str, overrides: &EndpointConfig) -> Result<Self> {
        let prefix = api_prefix.trim_end_matches('/');
        if !prefix.is_empty() {
            validate_endpoint_path("api_prefix", prefix)?;
        }
        overrides.validate()?;

        let paths = Operation::ALL
            .into_iter()
            .map(|op| {
                let path = overrides
                    .get(op)
                    .map_or_else(|| format!("{prefix}{}", op.default_path()), ToOwned::to_owned);
                (op, path)
            })
            .collect();

        Ok(Self { paths })
    }

    /// Returns the path template for `operation`.
    #[must_use]
    pub fn template(&self, operation: Operation) -> &str {
        // Every operation is inserted by `new`.
        self.paths.get(&operation).map_or(operation.default_path(), String::as_str)
    }

    /// Resolves a parameterless endpoint.
    #[must_use]
    pub fn path(&self, operation: Operation) -> EndpointPath {
        EndpointPath::parse(self.template(operation))
    }

    /// Resolves an endpoint with `id` appended as a path segment.
    #[must_use]
    pub fn path_with_id(&self, operation: Operation, id: &str) -> EndpointPath {
        let mut path = self.path(operation);
        path.segments.push(id.to_owned());
        path
    }

    /// Resolves the payment status endpoint for `id`.
    ///
    /// # Examples
    ///
    /// ```
    /// use upayments::endpoint::{EndpointConfig, EndpointTable, PaymentLookup};
    ///
    /// let table = EndpointTable::new("/api/v1", &EndpointConfig::default()).unwrap();
    /// assert_eq!(
    ///     table.payment_status("ORD123", PaymentLookup::TrackId).to_string(),
    ///     "/api/v1/get-payment-status/ORD123"
    /// );
    /// assert_eq!(
    ///     table.payment_status("ORD123", PaymentLookup::InvoiceId).to_string(),
    ///     "/api/v1/get-payment-status?invoice_id=ORD123"
    /// );
    /// ```
    #[must_use]
    pub fn payment_status(&self, id: &str, lookup: PaymentLookup) -> EndpointPath {
        match lookup {
            PaymentLookup::TrackId => self.path_with_id(Operation::GetPaymentStatus, id),
            PaymentLookup::InvoiceId => {
                self.path(Operation::GetPaymentStatus).with_query("invoice_id", id)
            }
        }
    }
}

/// A resolved request path: segments plus query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPath {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl EndpointPath {
    fn parse(template: &str) -> Self {
        let segments =
            template.split('/').filter(|s| !s.is_empty()).map(ToOwned::to_owned).collect();
        Self { segments, query: Vec::new() }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Joins this path onto `base`, keeping any path the base already has.
    ///
    /// Segments and query values are percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] if `base` cannot carry a path.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                UpaymentsError::Config(format!("base_url cannot be a base: {base}"))
            })?;
            segments.pop_if_empty().extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

impl fmt::Display for EndpointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}
