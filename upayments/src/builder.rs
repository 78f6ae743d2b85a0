//! Request builder for charges and multi-vendor refunds.
//!
//! [`RequestBuilder`] accumulates the parameter set of one transaction
//! through chained, consuming calls. Setters that carry required fields
//! validate them immediately; the `build_*` methods check that the
//! accumulated state is complete for the target endpoint.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use upayments::RequestBuilder;
//!
//! # fn main() -> upayments::Result<()> {
//! let parameters = RequestBuilder::default()
//!     .add_product("Test Product", "Description", 100.0, 1)
//!     .set_order(json!({
//!         "id": "ORD123",
//!         "description": "Order Description",
//!         "currency": "KWD",
//!         "amount": 100.0
//!     }))?
//!     .set_payment_gateway("knet")?
//!     .set_return_url("https://example.com/return")
//!     .set_cancel_url("https://example.com/cancel")
//!     .set_notification_url("https://example.com/notify")
//!     .build_payment()?;
//!
//! assert_eq!(parameters["paymentGateway"]["src"], "knet");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use serde_json::{Map, Value, json, map::Entry};

use crate::{
    error::{Result, UpaymentsError},
    profile::{ApiProfile, CREATE_INVOICE_GATEWAY, GatewayRequirement, NOTIFICATION_TYPES},
    requests::{MultiVendorRefundOptions, to_parameters},
};

/// Ordered JSON parameters sent as a request body.
pub type ParameterSet = Map<String, Value>;

/// Accumulates request parameters for one transaction.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    profile: Arc<ApiProfile>,
    parameters: ParameterSet,
    white_labeled: bool,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(Arc::new(ApiProfile::standard()))
    }
}

impl RequestBuilder {
    /// Creates an empty builder validating against `profile`.
    #[must_use]
    pub fn new(profile: Arc<ApiProfile>) -> Self {
        Self { profile, parameters: ParameterSet::new(), white_labeled: false }
    }

    /// Appends a product line.
    #[must_use]
    pub fn add_product(mut self, name: &str, description: &str, price: f64, quantity: u32) -> Self {
        self.push_entry(
            "products",
            json!({
                "name": name,
                "description": description,
                "price": price,
                "quantity": quantity,
            }),
        );
        self
    }

    /// Sets the order.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if `order` is not an object or
    /// lacks one of the profile's order fields.
    pub fn set_order(mut self, order: Value) -> Result<Self> {
        self.profile.field_policy.require_object("order", &order, &self.profile.order_fields)?;
        self.parameters.insert("order".to_owned(), order);
        Ok(self)
    }

    /// Sets the customer.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if `customer` lacks one of
    /// `uniqueId`, `name`, `email`, `mobile`.
    pub fn set_customer(mut self, customer: Value) -> Result<Self> {
        self.profile.field_policy.require_object(
            "customer",
            &customer,
            &self.profile.customer_fields,
        )?;
        self.parameters.insert("customer".to_owned(), customer);
        Ok(self)
    }

    /// Selects the payment gateway source.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if `source` is empty or not
    /// accepted by the profile.
    pub fn set_payment_gateway(mut self, source: &str) -> Result<Self> {
        if source.is_empty() {
            return Err(UpaymentsError::Validation(
                "The payment gateway source is required.".to_owned(),
            ));
        }
        check_gateway(&self.profile, source)?;

        match self.parameters.get_mut("paymentGateway") {
            Some(Value::Object(gateway)) => {
                gateway.insert("src".to_owned(), Value::from(source));
            }
            _ => {
                self.parameters.insert("paymentGateway".to_owned(), json!({ "src": source }));
            }
        }
        Ok(self)
    }

    /// Sets the payment page language.
    #[must_use]
    pub fn set_language(self, language: impl Into<String>) -> Self {
        self.set_string("language", language.into())
    }

    /// Sets the merchant reference, stored as `{"id": ...}`.
    #[must_use]
    pub fn set_reference(mut self, id: impl Into<String>) -> Self {
        self.parameters.insert("reference".to_owned(), json!({ "id": id.into() }));
        self
    }

    /// Sets the URL the customer returns to after paying.
    #[must_use]
    pub fn set_return_url(self, url: impl Into<String>) -> Self {
        self.set_string("returnUrl", url.into())
    }

    /// Sets the URL the customer returns to after cancelling.
    #[must_use]
    pub fn set_cancel_url(self, url: impl Into<String>) -> Self {
        self.set_string("cancelUrl", url.into())
    }

    /// Sets the server-to-server notification URL.
    #[must_use]
    pub fn set_notification_url(self, url: impl Into<String>) -> Self {
        self.set_string("notificationUrl", url.into())
    }

    /// Sets free-form customer data echoed back by the gateway.
    #[must_use]
    pub fn set_customer_extra_data(self, data: impl Into<String>) -> Self {
        self.set_string("customerExtraData", data.into())
    }

    /// Sets how an invoice is delivered.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] unless `notification_type` is
    /// one of `email`, `sms`, `link`, `all`.
    pub fn set_notification_type(self, notification_type: &str) -> Result<Self> {
        if !NOTIFICATION_TYPES.contains(&notification_type) {
            return Err(UpaymentsError::Validation(format!(
                "The notification type must be one of {}.",
                NOTIFICATION_TYPES.join(", ")
            )));
        }
        Ok(self.set_string("notificationType", notification_type.to_owned()))
    }

    /// Appends a vendor split to `extraMerchantData`.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if `data` lacks one of the
    /// profile's extra merchant fields.
    pub fn set_extra_merchant_data(mut self, data: Value) -> Result<Self> {
        self.profile.field_policy.require_object(
            "extra merchant",
            &data,
            &self.profile.extra_merchant_fields,
        )?;
        self.push_entry("extraMerchantData", data);
        Ok(self)
    }

    /// Appends `data` to `extraMerchantData` without inspecting it.
    ///
    /// The builder itself must already hold the order, gateway and callback
    /// URLs.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] naming the first missing
    /// prerequisite.
    pub fn add_merchant_data(mut self, data: Value) -> Result<Self> {
        self.profile
            .field_policy
            .require_fields(&self.parameters, &self.profile.merchant_data_prerequisites)?;
        self.push_entry("extraMerchantData", data);
        Ok(self)
    }

    /// Appends a vendor entry to `refundPayload`.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if `vendor` lacks one of the
    /// profile's refund vendor fields.
    pub fn add_refund_vendor(mut self, vendor: Value) -> Result<Self> {
        self.profile.field_policy.require_object(
            "refund vendor",
            &vendor,
            &self.profile.refund_vendor_fields,
        )?;
        self.push_entry("refundPayload", vendor);
        Ok(self)
    }

    /// Marks the merchant as white labeled: charges must name a gateway.
    #[must_use]
    pub fn mark_as_white_labeled(mut self) -> Self {
        self.white_labeled = true;
        self
    }

    /// Marks the merchant as using the hosted gateway picker.
    #[must_use]
    pub fn mark_as_non_white_labeled(mut self) -> Self {
        self.white_labeled = false;
        self
    }

    /// Returns `true` if the merchant is marked as white labeled.
    #[must_use]
    pub fn is_white_labeled(&self) -> bool {
        self.white_labeled
    }

    /// Returns the selected gateway source, if any.
    #[must_use]
    pub fn gateway_source(&self) -> Option<&str> {
        self.parameters.get("paymentGateway")?.get("src")?.as_str()
    }

    /// Returns the profile this builder validates against.
    #[must_use]
    pub fn profile(&self) -> &ApiProfile {
        &self.profile
    }

    /// Returns the accumulated parameters.
    #[must_use]
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Consumes the builder, returning the accumulated parameters.
    #[must_use]
    pub fn into_parameters(self) -> ParameterSet {
        self.parameters
    }

    /// Checks the accumulated state and returns the charge body.
    ///
    /// Required: `order`, `returnUrl`, `cancelUrl`, `notificationUrl`;
    /// `paymentGateway` when the profile demands it (always, or for white
    /// labeled merchants); `customer` and `notificationType` when the
    /// gateway is `create-invoice`.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] naming the first missing field.
    pub fn build_payment(&self) -> Result<ParameterSet> {
        self.build_payment_for(&self.profile)
    }

    /// Like [`build_payment`](Self::build_payment), but checks the
    /// accumulated state against `profile` instead of the builder's own.
    ///
    /// Setter-time checks are repeated too: the `order` and `customer`
    /// objects must carry the fields `profile` requires, and the gateway
    /// source must be one `profile` accepts.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] naming the first problem.
    pub fn build_payment_for(&self, profile: &ApiProfile) -> Result<ParameterSet> {
        let policy = profile.field_policy;
        if let Some(order) = self.parameters.get("order") {
            policy.require_object("order", order, &profile.order_fields)?;
        }
        if let Some(customer) = self.parameters.get("customer") {
            policy.require_object("customer", customer, &profile.customer_fields)?;
        }
        if let Some(source) = self.gateway_source() {
            check_gateway(profile, source)?;
        }

        let mut required = profile.payment_fields.clone();

        let needs_gateway = match profile.gateway_requirement {
            GatewayRequirement::Always => true,
            GatewayRequirement::WhenWhiteLabeled => self.white_labeled,
        };
        if needs_gateway {
            required.push("paymentGateway".to_owned());
        }
        if self.gateway_source() == Some(CREATE_INVOICE_GATEWAY) {
            required.extend(profile.invoice_fields.iter().cloned());
        }

        policy.require_fields(&self.parameters, &required)?;
        Ok(self.parameters.clone())
    }

    /// Returns the multi-vendor refund body for `order_id`.
    ///
    /// The body holds the accumulated `refundPayload`, the order id and the
    /// non-empty options; other builder state is not sent.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if `order_id` is empty.
    pub fn build_multi_vendor_refund(
        &self,
        order_id: &str,
        options: &MultiVendorRefundOptions,
    ) -> Result<ParameterSet> {
        if order_id.is_empty() {
            return Err(UpaymentsError::Validation(
                "The order ID is required for multi-vendor refund.".to_owned(),
            ));
        }

        let mut body = ParameterSet::new();
        if let Some(payload) = self.parameters.get("refundPayload") {
            body.insert("refundPayload".to_owned(), payload.clone());
        }
        body.insert("orderId".to_owned(), Value::from(order_id));
        body.extend(to_parameters(options)?);
        Ok(body)
    }

    fn set_string(mut self, key: &str, value: String) -> Self {
        self.parameters.insert(key.to_owned(), Value::String(value));
        self
    }

    fn push_entry(&mut self, key: &str, value: Value) {
        match self.parameters.entry(key) {
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Value::Array(items) => items.push(value),
                other => *other = Value::Array(vec![value]),
            },
            Entry::Vacant(entry) => {
                entry.insert(Value::Array(vec![value]));
            }
        }
    }
}

/// Formats `a, b and c`.
fn check_gateway(profile: &ApiProfile, source: &str) -> Result<()> {
    if profile.accepts_gateway(source) {
        return Ok(());
    }
    let allowed = profile.allowed_gateways.as_deref().unwrap_or_default();
    Err(UpaymentsError::Validation(format!(
        "The payment gateway source is not valid, please add one of {}.",
        list_choices(allowed)
    )))
}

fn list_choices(choices: &[String]) -> String {
    match choices {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        profile::ApiProfile,
        requests::RefundOptions,
        validation::RequiredFieldPolicy,
    };

    use super::*;

    fn order() -> Value {
        json!({
            "id": "ORD123",
            "description": "Order Description",
            "currency": "KWD",
            "amount": 100.0
        })
    }

    fn customer() -> Value {
        json!({
            "uniqueId": "CUST123",
            "name": "John Doe",
            "email": "john.doe@example.com",
            "mobile": "+96512345678"
        })
    }

    fn vendor(id: &str) -> Value {
        json!({
            "refundRequestId": id,
            "ibanNumber": "KW91KFHO0000000000051010173254",
            "totalPaid": "100.0",
            "refundedAmount": 1.0,
            "remainingLimit": 100.0,
            "amountToRefund": 10.0,
            "merchantType": "vendor"
        })
    }

    fn ready() -> RequestBuilder {
        RequestBuilder::default()
            .set_order(order())
            .unwrap()
            .set_return_url("https://example.com/return")
            .set_cancel_url("https://example.com/cancel")
            .set_notification_url("https://example.com/notify")
    }

    #[test]
    fn test_add_product_appends_in_order() {
        let builder = RequestBuilder::default()
            .add_product("A", "first", 1.5, 1)
            .add_product("B", "second", 2.0, 3);

        let products = builder.parameters()["products"].as_array().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0],
            json!({"name": "A", "description": "first", "price": 1.5, "quantity": 1})
        );
        assert_eq!(products[1]["name"], "B");
    }

    #[test]
    fn test_set_order_requires_each_field() {
        for field in ["id", "description", "currency", "amount"] {
            let mut data = order();
            data.as_object_mut().unwrap().remove(field);
            let err = RequestBuilder::default().set_order(data).unwrap_err();
            assert_eq!(err.to_string(), format!("The field '{field}' is required."));
        }
    }

    #[test]
    fn test_set_order_zero_amount_depends_on_policy() {
        let mut data = order();
        data["amount"] = json!(0);

        assert!(RequestBuilder::default().set_order(data.clone()).is_err());

        let lenient = ApiProfile::standard().with_field_policy(RequiredFieldPolicy::Present);
        assert!(RequestBuilder::new(Arc::new(lenient)).set_order(data).is_ok());
    }

    #[test]
    fn test_legacy_order_requires_reference() {
        let legacy = RequestBuilder::new(Arc::new(ApiProfile::legacy()));
        let err = legacy.set_order(order()).unwrap_err();
        assert_eq!(err.to_string(), "The field 'reference' is required.");
    }

    #[test]
    fn test_set_customer_rejects_empty_email() {
        let mut data = customer();
        data["email"] = json!("");
        let err = RequestBuilder::default().set_customer(data).unwrap_err();
        assert_eq!(err.to_string(), "The field 'email' is required.");
    }

    #[test]
    fn test_set_payment_gateway_accepts_enumerated_sources() {
        for source in crate::profile::STANDARD_GATEWAYS {
            let builder = RequestBuilder::default().set_payment_gateway(source).unwrap();
            assert_eq!(builder.gateway_source(), Some(*source));
        }
    }

    #[test]
    fn test_set_payment_gateway_rejects_unknown_source() {
        let err = RequestBuilder::default().set_payment_gateway("paypal").unwrap_err();
        assert_eq!(
            err.to_string(),
            "The payment gateway source is not valid, please add one of knet, cc, samsung-pay, \
             apple-pay, google-pay and create-invoice."
        );

        let err = RequestBuilder::default().set_payment_gateway("").unwrap_err();
        assert_eq!(err.to_string(), "The payment gateway source is required.");
    }

    #[test]
    fn test_legacy_accepts_any_gateway() {
        let builder = RequestBuilder::new(Arc::new(ApiProfile::legacy()))
            .set_payment_gateway("paypal")
            .unwrap();
        assert_eq!(builder.gateway_source(), Some("paypal"));
    }

    #[test]
    fn test_plain_setters() {
        let params = RequestBuilder::default()
            .set_language("ar")
            .set_reference("REF1")
            .set_customer_extra_data("vip")
            .into_parameters();

        assert_eq!(params["language"], "ar");
        assert_eq!(params["reference"], json!({"id": "REF1"}));
        assert_eq!(params["customerExtraData"], "vip");
    }

    #[test]
    fn test_set_notification_type() {
        assert!(RequestBuilder::default().set_notification_type("sms").is_ok());
        let err = RequestBuilder::default().set_notification_type("fax").unwrap_err();
        assert_eq!(err.to_string(), "The notification type must be one of email, sms, link, all.");
    }

    #[test]
    fn test_set_extra_merchant_data() {
        let data = json!({
            "amount": 10,
            "knetCharge": 1,
            "knetChargeType": "fixed",
            "ccCharge": 2,
            "ccChargeType": "percentage",
            "ibanNumber": "KW91KFHO0000000000051010173254"
        });
        let builder = RequestBuilder::default().set_extra_merchant_data(data).unwrap();
        assert_eq!(builder.parameters()["extraMerchantData"].as_array().unwrap().len(), 1);

        let err = RequestBuilder::default()
            .set_extra_merchant_data(json!({"amount": 10}))
            .unwrap_err();
        assert_eq!(err.to_string(), "The field 'knetCharge' is required.");
    }

    #[test]
    fn test_add_merchant_data_checks_builder_state() {
        let err = ready().add_merchant_data(json!({"anything": true})).unwrap_err();
        assert_eq!(err.to_string(), "The field 'paymentGateway' is required.");

        let builder = ready()
            .set_payment_gateway("knet")
            .unwrap()
            .add_merchant_data(json!({"anything": true}))
            .unwrap();
        assert_eq!(builder.parameters()["extraMerchantData"], json!([{"anything": true}]));
    }

    #[test]
    fn test_build_payment_requires_callbacks() {
        let err = RequestBuilder::default().set_order(order()).unwrap().build_payment().unwrap_err();
        assert_eq!(err.to_string(), "The field 'returnUrl' is required.");
        assert!(ready().build_payment().is_ok());
    }

    #[test]
    fn test_build_payment_white_label_requires_gateway() {
        let err = ready().mark_as_white_labeled().build_payment().unwrap_err();
        assert_eq!(err.to_string(), "The field 'paymentGateway' is required.");

        let builder = ready().mark_as_white_labeled().mark_as_non_white_labeled();
        assert!(!builder.is_white_labeled());
        assert!(builder.build_payment().is_ok());
    }

    #[test]
    fn test_build_payment_legacy_always_requires_gateway() {
        let mut legacy_order = order();
        legacy_order["reference"] = json!("REF123");
        let builder = RequestBuilder::new(Arc::new(ApiProfile::legacy()))
            .set_order(legacy_order)
            .unwrap()
            .set_return_url("https://example.com/return")
            .set_cancel_url("https://example.com/cancel")
            .set_notification_url("https://example.com/notify");

        let err = builder.build_payment().unwrap_err();
        assert_eq!(err.to_string(), "The field 'paymentGateway' is required.");
    }

    #[test]
    fn test_build_payment_for_applies_given_profile() {
        let builder = RequestBuilder::default()
            .set_order(order())
            .unwrap()
            .set_return_url("https://example.com/return")
            .set_cancel_url("https://example.com/cancel")
            .set_notification_url("https://example.com/notify");
        assert!(builder.build_payment().is_ok());

        let legacy = ApiProfile::legacy();
        let err = builder.build_payment_for(&legacy).unwrap_err();
        assert_eq!(err.to_string(), "The field 'reference' is required.");

        let mut legacy_order = order();
        legacy_order["reference"] = json!("REF123");
        let builder = builder.set_order(legacy_order).unwrap();
        let err = builder.build_payment_for(&legacy).unwrap_err();
        assert_eq!(err.to_string(), "The field 'paymentGateway' is required.");
        assert!(builder.set_payment_gateway("knet").unwrap().build_payment_for(&legacy).is_ok());
    }

    #[test]
    fn test_build_payment_for_rechecks_gateway_source() {
        let builder = RequestBuilder::new(Arc::new(ApiProfile::legacy()))
            .set_order(json!({
                "id": "ORD123",
                "description": "Order Description",
                "currency": "KWD",
                "amount": 100.0,
                "reference": "REF123"
            }))
            .unwrap()
            .set_payment_gateway("benefit")
            .unwrap()
            .set_return_url("https://example.com/return")
            .set_cancel_url("https://example.com/cancel")
            .set_notification_url("https://example.com/notify");
        assert!(builder.build_payment().is_ok());

        let err = builder.build_payment_for(&ApiProfile::standard()).unwrap_err();
        assert!(err.to_string().starts_with("The payment gateway source is not valid"), "{err}");
    }

    #[test]
    fn test_build_payment_invoice_requires_customer_and_notification_type() {
        let invoice = ready().set_payment_gateway("create-invoice").unwrap();
        let err = invoice.build_payment().unwrap_err();
        assert_eq!(err.to_string(), "The field 'customer' is required.");

        let invoice = invoice.set_customer(customer()).unwrap();
        let err = invoice.build_payment().unwrap_err();
        assert_eq!(err.to_string(), "The field 'notificationType' is required.");

        let params = invoice.set_notification_type("email").unwrap().build_payment().unwrap();
        assert_eq!(params["notificationType"], "email");
    }

    #[test]
    fn test_add_refund_vendor_validates() {
        let mut incomplete = vendor("REF1");
        incomplete.as_object_mut().unwrap().remove("merchantType");
        let err = RequestBuilder::default().add_refund_vendor(incomplete).unwrap_err();
        assert_eq!(err.to_string(), "The field 'merchantType' is required.");
    }

    #[test]
    fn test_build_multi_vendor_refund() {
        let builder = RequestBuilder::default()
            .add_product("ignored", "not part of a refund", 1.0, 1)
            .add_refund_vendor(vendor("REF123"))
            .unwrap()
            .add_refund_vendor(vendor("REF124"))
            .unwrap();
        let options = MultiVendorRefundOptions::default().with_refund(
            RefundOptions::default()
                .with_reference("REF12345")
                .with_notify_url("https://example.com/notify"),
        );

        let body = builder.build_multi_vendor_refund("ORD123", &options).unwrap();

        let keys: Vec<&str> = body.keys().map(String::as_str).collect();
        assert_eq!(keys, ["refundPayload", "orderId", "reference", "notifyUrl"]);
        assert_eq!(body["refundPayload"], json!([vendor("REF123"), vendor("REF124")]));
    }

    #[test]
    fn test_build_multi_vendor_refund_requires_order_id() {
        let err = RequestBuilder::default()
            .build_multi_vendor_refund("", &MultiVendorRefundOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "The order ID is required for multi-vendor refund.");
    }

    #[test]
    fn test_list_choices() {
        assert_eq!(list_choices(&[]), "");
        assert_eq!(list_choices(&["a".to_owned()]), "a");
        assert_eq!(list_choices(&["a".to_owned(), "b".to_owned(), "c".to_owned()]), "a, b and c");
    }
}
