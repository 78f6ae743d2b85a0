//! API profiles: declarative validation rules and endpoint prefix.
//!
//! Integrations in the field target two flavours of the gateway API that
//! differ in endpoint prefix, order requirements and how strictly the payment
//! gateway source is checked. Both are available as named presets; a profile
//! can also be built field by field.

use std::str::FromStr;

use serde::Deserialize;

use crate::{error::UpaymentsError, validation::RequiredFieldPolicy};

/// Payment gateway sources accepted by the standard profile.
pub const STANDARD_GATEWAYS: &[&str] =
    &["knet", "cc", "samsung-pay", "apple-pay", "google-pay", "create-invoice"];

/// Gateway source that turns a charge into an emailed/SMS invoice.
pub const CREATE_INVOICE_GATEWAY: &str = "create-invoice";

/// Accepted values for `notificationType`.
pub const NOTIFICATION_TYPES: &[&str] = &["email", "sms", "link", "all"];

/// Name of a built-in profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    /// `/api/v1` endpoints, enumerated gateway sources, white-label toggle.
    #[default]
    Standard,
    /// Versioned base URL, orders require a `reference`, any gateway source.
    Legacy,
}

impl FromStr for ProfileName {
    type Err = UpaymentsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "legacy" => Ok(Self::Legacy),
            other => Err(UpaymentsError::Config(format!(
                "unknown profile '{other}', expected 'standard' or 'legacy'"
            ))),
        }
    }
}

/// When `createPayment` requires a `paymentGateway`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayRequirement {
    /// Only for white-labeled merchants.
    WhenWhiteLabeled,
    /// On every charge.
    Always,
}

/// Validation rules and endpoint prefix for one API flavour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiProfile {
    /// Profile name.
    pub name: ProfileName,
    /// Prefix prepended to every default endpoint path (e.g. `/api/v1`).
    pub api_prefix: String,
    /// Emptiness rule used by all required-field checks.
    pub field_policy: RequiredFieldPolicy,
    /// Keys required in `order` data.
    pub order_fields: Vec<String>,
    /// Keys required in `customer` data.
    pub customer_fields: Vec<String>,
    /// Keys required by `set_extra_merchant_data`.
    pub extra_merchant_fields: Vec<String>,
    /// Builder state required before `add_merchant_data`.
    pub merchant_data_prerequisites: Vec<String>,
    /// Keys required in each refund vendor entry.
    pub refund_vendor_fields: Vec<String>,
    /// Builder state required by every charge.
    pub payment_fields: Vec<String>,
    /// Extra builder state required when the gateway is `create-invoice`.
    pub invoice_fields: Vec<String>,
    /// When a charge needs a gateway source.
    pub gateway_requirement: GatewayRequirement,
    /// Accepted gateway sources; `None` accepts any non-empty value.
    pub allowed_gateways: Option<Vec<String>>,
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_owned()).collect()
}

impl ApiProfile {
    /// Profile matching the current `/api/v1` gateway API.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            name: ProfileName::Standard,
            api_prefix: "/api/v1".to_owned(),
            field_policy: RequiredFieldPolicy::Truthy,
            order_fields: owned(&["id", "description", "currency", "amount"]),
            customer_fields: owned(&["uniqueId", "name", "email", "mobile"]),
            extra_merchant_fields: owned(&[
                "amount",
                "knetCharge",
                "knetChargeType",
                "ccCharge",
                "ccChargeType",
                "ibanNumber",
            ]),
            merchant_data_prerequisites: owned(&[
                "order",
                "paymentGateway",
                "returnUrl",
                "cancelUrl",
                "notificationUrl",
            ]),
            refund_vendor_fields: owned(&[
                "refundRequestId",
                "ibanNumber",
                "totalPaid",
                "refundedAmount",
                "remainingLimit",
                "amountToRefund",
                "merchantType",
            ]),
            payment_fields: owned(&["order", "returnUrl", "cancelUrl", "notificationUrl"]),
            invoice_fields: owned(&["customer", "notificationType"]),
            gateway_requirement: GatewayRequirement::WhenWhiteLabeled,
            allowed_gateways: Some(owned(STANDARD_GATEWAYS)),
        }
    }

    /// Profile for integrations whose base URL already carries the API
    /// version.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            name: ProfileName::Legacy,
            api_prefix: String::new(),
            order_fields: owned(&["id", "reference", "description", "currency", "amount"]),
            gateway_requirement: GatewayRequirement::Always,
            allowed_gateways: None,
            ..Self::standard()
        }
    }

    /// Returns the preset for `name`.
    #[must_use]
    pub fn from_name(name: ProfileName) -> Self {
        match name {
            ProfileName::Standard => Self::standard(),
            ProfileName::Legacy => Self::legacy(),
        }
    }

    /// Replaces the emptiness rule.
    #[must_use]
    pub fn with_field_policy(mut self, policy: RequiredFieldPolicy) -> Self {
        self.field_policy = policy;
        self
    }

    /// Returns `true` if `source` is an accepted gateway source.
    #[must_use]
    pub fn accepts_gateway(&self, source: &str) -> bool {
        self.allowed_gateways
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|g| g == source))
    }
}

impl Default for ApiProfile {
    fn default() -> Self {
        Self::standard()
    }
}
