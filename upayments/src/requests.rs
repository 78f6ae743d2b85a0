//! Request bodies for the refund and card operations.
//!
//! Each body validates its arguments on construction, so an invalid request
//! never reaches the network.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    builder::ParameterSet,
    error::{Result, UpaymentsError},
    validation::require_non_empty,
};

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// Optional refund parameters. Empty values are left out of the body.
///
/// # Examples
///
/// ```
/// use upayments::requests::RefundOptions;
///
/// let options = RefundOptions::default()
///     .with_customer_first_name("John")
///     .with_reference("REF12345");
/// assert_eq!(options.reference.as_deref(), Some("REF12345"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundOptions {
    /// Customer first name.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub customer_first_name: Option<String>,
    /// Customer email.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub customer_email: Option<String>,
    /// Customer mobile number.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub customer_mobile_number: Option<String>,
    /// Merchant reference.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub reference: Option<String>,
    /// URL notified when the refund settles.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub notify_url: Option<String>,
}

impl RefundOptions {
    /// Sets the customer first name.
    #[must_use]
    pub fn with_customer_first_name(mut self, value: impl Into<String>) -> Self {
        self.customer_first_name = Some(value.into());
        self
    }

    /// Sets the customer email.
    #[must_use]
    pub fn with_customer_email(mut self, value: impl Into<String>) -> Self {
        self.customer_email = Some(value.into());
        self
    }

    /// Sets the customer mobile number.
    #[must_use]
    pub fn with_customer_mobile_number(mut self, value: impl Into<String>) -> Self {
        self.customer_mobile_number = Some(value.into());
        self
    }

    /// Sets the merchant reference.
    #[must_use]
    pub fn with_reference(mut self, value: impl Into<String>) -> Self {
        self.reference = Some(value.into());
        self
    }

    /// Sets the notification URL.
    #[must_use]
    pub fn with_notify_url(mut self, value: impl Into<String>) -> Self {
        self.notify_url = Some(value.into());
        self
    }
}

/// Optional multi-vendor refund parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiVendorRefundOptions {
    /// Receipt id of the original payment.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub receipt_id: Option<String>,
    /// Parameters shared with single refunds.
    #[serde(flatten)]
    pub refund: RefundOptions,
}

impl MultiVendorRefundOptions {
    /// Sets the receipt id.
    #[must_use]
    pub fn with_receipt_id(mut self, value: impl Into<String>) -> Self {
        self.receipt_id = Some(value.into());
        self
    }

    /// Sets the shared refund parameters.
    #[must_use]
    pub fn with_refund(mut self, refund: RefundOptions) -> Self {
        self.refund = refund;
        self
    }
}

/// Body of `create-refund`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRefundRequest {
    order_id: String,
    total_price: f64,
    #[serde(flatten)]
    options: RefundOptions,
}

impl CreateRefundRequest {
    /// Validates and builds the body.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if `order_id` is empty or
    /// `total_price` is not a finite amount above zero.
    pub fn new(order_id: &str, total_price: f64, options: RefundOptions) -> Result<Self> {
        if order_id.is_empty() || !total_price.is_finite() || total_price <= 0.0 {
            return Err(UpaymentsError::Validation(
                "The order ID and a valid total price are required for a refund.".to_owned(),
            ));
        }
        Ok(Self { order_id: order_id.to_owned(), total_price, options })
    }
}

/// Body of `delete-refund`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRefundRequest {
    order_id: String,
    refund_order_id: String,
}

impl DeleteRefundRequest {
    /// Builds the body. The gateway validates both ids.
    #[must_use]
    pub fn new(order_id: &str, refund_order_id: &str) -> Self {
        Self { order_id: order_id.to_owned(), refund_order_id: refund_order_id.to_owned() }
    }
}

/// Body of `delete-multivendor-refund`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMultiVendorRefundRequest {
    generated_invoice_id: String,
    order_id: String,
    refund_order_id: String,
    refund_arn: String,
}

impl DeleteMultiVendorRefundRequest {
    /// Validates and builds the body.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if any id is empty.
    pub fn new(
        generated_invoice_id: &str,
        order_id: &str,
        refund_order_id: &str,
        refund_arn: &str,
    ) -> Result<Self> {
        require_non_empty(
            &[generated_invoice_id, order_id, refund_order_id, refund_arn],
            "All parameters are required for deleting a multi-vendor refund.",
        )?;
        Ok(Self {
            generated_invoice_id: generated_invoice_id.to_owned(),
            order_id: order_id.to_owned(),
            refund_order_id: refund_order_id.to_owned(),
            refund_arn: refund_arn.to_owned(),
        })
    }
}

/// Body of `create-customer-unique-token` and `retrieve-customer-cards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTokenRequest {
    customer_unique_token: String,
}

impl CustomerTokenRequest {
    /// Validates and builds the body.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if the token is empty.
    pub fn new(customer_unique_token: &str) -> Result<Self> {
        require_non_empty(&[customer_unique_token], "The customer unique token is required.")?;
        Ok(Self { customer_unique_token: customer_unique_token.to_owned() })
    }
}

/// Body of `add-card`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCardRequest {
    return_url: String,
    customer_unique_token: String,
}

impl AddCardRequest {
    /// Validates and builds the body.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if either argument is empty.
    pub fn new(return_url: &str, customer_unique_token: &str) -> Result<Self> {
        require_non_empty(
            &[return_url, customer_unique_token],
            "Both return URL and customer unique token are required.",
        )?;
        Ok(Self {
            return_url: return_url.to_owned(),
            customer_unique_token: customer_unique_token.to_owned(),
        })
    }
}

/// Serializes a request body into a parameter set.
pub(crate) fn to_parameters<T: Serialize>(body: &T) -> Result<ParameterSet> {
    match serde_json::to_value(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(UpaymentsError::Validation(format!(
            "request body must be a JSON object, got {other}"
        ))),
        Err(e) => Err(UpaymentsError::Validation(format!("invalid request body: {e}"))),
    }
}
