//! UPayments gateway client.
//!
//! [`UpaymentsClient`] owns the resolved endpoint table, the active profile,
//! the retry policy and the optional request logger. Each public operation
//! validates its input, issues one logical call through [`send`], and turns
//! the gateway's `{status, data, message}` envelope into an [`ApiResponse`] or
//! an [`UpaymentsError`].
//!
//! [`send`]: UpaymentsClient::send

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::{
    builder::{ParameterSet, RequestBuilder},
    config::{ApiKey, ClientConfig},
    endpoint::{EndpointPath, EndpointTable, Operation, PaymentLookup},
    error::{GENERIC_API_MESSAGE, Result, UNKNOWN_ERROR_MESSAGE, UpaymentsError},
    logging::{AttemptContext, RequestLogger, TracingRequestLogger},
    profile::ApiProfile,
    reliability::{RetryPolicy, is_retryable, is_retryable_status, retry_with_backoff},
    requests::{
        AddCardRequest, CreateRefundRequest, CustomerTokenRequest, DeleteMultiVendorRefundRequest,
        DeleteRefundRequest, MultiVendorRefundOptions, RefundOptions, to_parameters,
    },
    response::{ApiResponse, body_message},
    transport::{HttpRequest, HttpTransport, RawResponse, Transport},
    validation::{is_truthy, require_non_empty},
};

/// Client for the UPayments gateway API.
///
/// The client is `Send + Sync`; share it behind an `Arc` to reuse the
/// connection pool.
///
/// # Examples
///
/// ```rust,no_run
/// use serde_json::json;
/// use upayments::{ClientConfig, UpaymentsClient};
///
/// # async fn example() -> upayments::Result<()> {
/// let client = UpaymentsClient::new(ClientConfig::new("e66a94d579cf75fba327ff716ad68c53aae11528"))?;
///
/// let builder = client
///     .request_builder()
///     .add_product("Test Product", "Description", 100.0, 1)
///     .set_order(json!({
///         "id": "ORD123",
///         "description": "Order Description",
///         "currency": "KWD",
///         "amount": 100.0
///     }))?
///     .set_payment_gateway("knet")?
///     .set_return_url("https://example.com/return")
///     .set_cancel_url("https://example.com/cancel")
///     .set_notification_url("https://example.com/notify");
///
/// let response = client.create_payment(&builder).await?;
/// println!("Pay at {:?}", response.data_str("link"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UpaymentsClient<T: Transport = HttpTransport> {
    transport: T,
    base_url: Url,
    api_key: ApiKey,
    profile: Arc<ApiProfile>,
    endpoints: EndpointTable,
    retry: RetryPolicy,
    logger: Option<Arc<dyn RequestLogger>>,
}

impl UpaymentsClient<HttpTransport> {
    /// Creates a client over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] if the configuration is invalid or
    /// the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_config(&config.http)?;
        Self::with_transport(config, transport)
    }

    /// Creates a client from `UPAYMENTS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] if the environment is incomplete or
    /// invalid.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: Transport> UpaymentsClient<T> {
    /// Creates a client over `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Config`] if the configuration is invalid.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url()?;
        let profile = config.api_profile();
        let endpoints = EndpointTable::new(&profile.api_prefix, &config.endpoints)?;
        let logger: Option<Arc<dyn RequestLogger>> = config
            .logging
            .enabled
            .then(|| Arc::new(TracingRequestLogger::new(config.logging.channel.clone())) as _);

        tracing::debug!(
            base_url = %base_url,
            profile = ?profile.name,
            protocol = transport.protocol_name(),
            logging = logger.is_some(),
            "UPayments client created"
        );

        Ok(Self {
            transport,
            base_url,
            api_key: config.api_key,
            profile: Arc::new(profile),
            endpoints,
            retry: config.retry,
            logger,
        })
    }

    /// Replaces the request logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Disables request logging.
    #[must_use]
    pub fn without_logging(mut self) -> Self {
        self.logger = None;
        self
    }

    /// Returns a fresh builder validating against this client's profile.
    #[must_use]
    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(Arc::clone(&self.profile))
    }

    /// Returns the active profile.
    #[must_use]
    pub fn profile(&self) -> &ApiProfile {
        &self.profile
    }

    /// Returns the resolved endpoint table.
    #[must_use]
    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    /// Returns the gateway base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Creates a charge from the builder's accumulated parameters.
    ///
    /// The builder is checked against this client's profile, whatever
    /// profile it was created with.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the builder is incomplete, otherwise the
    /// outcome of the gateway call.
    #[instrument(skip(self, builder), fields(white_labeled = builder.is_white_labeled()))]
    pub async fn create_payment(&self, builder: &RequestBuilder) -> Result<ApiResponse> {
        let body = builder.build_payment_for(&self.profile)?;
        self.send(Method::POST, &self.endpoints.path(Operation::CreatePayment), Some(&body)).await
    }

    /// Looks up a payment by track id or invoice id.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `id` is empty, otherwise the outcome of
    /// the gateway call.
    #[instrument(skip(self))]
    pub async fn get_payment_status(&self, id: &str, lookup: PaymentLookup) -> Result<ApiResponse> {
        require_non_empty(&[id], "The payment ID is required.")?;
        self.send(Method::GET, &self.endpoints.payment_status(id, lookup), None).await
    }

    /// Lists the payment buttons enabled for the merchant.
    ///
    /// # Errors
    ///
    /// Returns the outcome of the gateway call.
    #[instrument(skip(self))]
    pub async fn check_payment_button_status(&self) -> Result<ApiResponse> {
        self.send(Method::GET, &self.endpoints.path(Operation::CheckPaymentButtonStatus), None)
            .await
    }

    /// Refunds `total_price` of an order.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `order_id` is empty or `total_price` is
    /// not above zero, otherwise the outcome of the gateway call.
    #[instrument(skip(self, options))]
    pub async fn create_refund(
        &self,
        order_id: &str,
        total_price: f64,
        options: RefundOptions,
    ) -> Result<ApiResponse> {
        let body = to_parameters(&CreateRefundRequest::new(order_id, total_price, options)?)?;
        self.send(Method::POST, &self.endpoints.path(Operation::CreateRefund), Some(&body)).await
    }

    /// Checks the refund state of an order.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `order_id` is empty, otherwise the
    /// outcome of the gateway call.
    #[instrument(skip(self))]
    pub async fn get_refund_status(&self, order_id: &str) -> Result<ApiResponse> {
        require_non_empty(&[order_id], "The order ID is required.")?;
        let path = self.endpoints.path_with_id(Operation::GetRefundStatus, order_id);
        self.send(Method::GET, &path, None).await
    }

    /// Checks the state of a single refund.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `order_id` is empty, otherwise the
    /// outcome of the gateway call.
    #[instrument(skip(self))]
    pub async fn check_single_refund_status(&self, order_id: &str) -> Result<ApiResponse> {
        require_non_empty(&[order_id], "The order ID is required.")?;
        let path = self.endpoints.path_with_id(Operation::CheckSingleRefundStatus, order_id);
        self.send(Method::GET, &path, None).await
    }

    /// Cancels a pending refund.
    ///
    /// # Errors
    ///
    /// Returns the outcome of the gateway call.
    #[instrument(skip(self))]
    pub async fn delete_refund(&self, order_id: &str, refund_order_id: &str) -> Result<ApiResponse> {
        let body = to_parameters(&DeleteRefundRequest::new(order_id, refund_order_id))?;
        self.send(Method::POST, &self.endpoints.path(Operation::DeleteRefund), Some(&body)).await
    }

    /// Issues a refund split across the vendors added to `builder`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `order_id` is empty, otherwise the
    /// outcome of the gateway call.
    #[instrument(skip(self, builder, options))]
    pub async fn create_multi_vendor_refund(
        &self,
        builder: &RequestBuilder,
        order_id: &str,
        options: &MultiVendorRefundOptions,
    ) -> Result<ApiResponse> {
        let body = builder.build_multi_vendor_refund(order_id, options)?;
        let path = self.endpoints.path(Operation::CreateMultiVendorRefund);
        self.send(Method::POST, &path, Some(&body)).await
    }

    /// Cancels a pending multi-vendor refund.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any id is empty, otherwise the outcome
    /// of the gateway call.
    #[instrument(skip(self))]
    pub async fn delete_multi_vendor_refund(
        &self,
        generated_invoice_id: &str,
        order_id: &str,
        refund_order_id: &str,
        refund_arn: &str,
    ) -> Result<ApiResponse> {
        let request = DeleteMultiVendorRefundRequest::new(
            generated_invoice_id,
            order_id,
            refund_order_id,
            refund_arn,
        )?;
        let body = to_parameters(&request)?;
        let path = self.endpoints.path(Operation::DeleteMultiVendorRefund);
        self.send(Method::POST, &path, Some(&body)).await
    }

    /// Registers a customer token for card storage.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the token is empty, otherwise the
    /// outcome of the gateway call.
    #[instrument(skip(self, customer_unique_token))]
    pub async fn create_customer_unique_token(
        &self,
        customer_unique_token: &str,
    ) -> Result<ApiResponse> {
        let body = to_parameters(&CustomerTokenRequest::new(customer_unique_token)?)?;
        let path = self.endpoints.path(Operation::CreateCustomerToken);
        self.send(Method::POST, &path, Some(&body)).await
    }

    /// Starts the add-card flow for a customer.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either argument is empty, otherwise the
    /// outcome of the gateway call.
    #[instrument(skip(self, customer_unique_token))]
    pub async fn add_card(&self, return_url: &str, customer_unique_token: &str) -> Result<ApiResponse> {
        let body = to_parameters(&AddCardRequest::new(return_url, customer_unique_token)?)?;
        self.send(Method::POST, &self.endpoints.path(Operation::AddCard), Some(&body)).await
    }

    /// Lists the stored cards of a customer.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the token is empty, otherwise the
    /// outcome of the gateway call.
    #[instrument(skip(self, customer_unique_token))]
    pub async fn retrieve_customer_cards(&self, customer_unique_token: &str) -> Result<ApiResponse> {
        let body = to_parameters(&CustomerTokenRequest::new(customer_unique_token)?)?;
        let path = self.endpoints.path(Operation::RetrieveCustomerCards);
        self.send(Method::POST, &path, Some(&body)).await
    }

    /// Issues one logical call.
    ///
    /// The body is sent only when present and non-empty. Network failures
    /// and 5xx responses are retried per the retry policy; every other
    /// outcome is final.
    ///
    /// # Errors
    ///
    /// - [`UpaymentsError::Api`] if the gateway reports `status: false`
    /// - [`UpaymentsError::Transport`] on network failure, a non-2xx status,
    ///   or a success body without a `status` field
    pub async fn send(
        &self,
        method: Method,
        path: &EndpointPath,
        body: Option<&ParameterSet>,
    ) -> Result<ApiResponse> {
        let body = match body {
            Some(parameters) if !parameters.is_empty() => {
                Some(serde_json::to_vec(parameters).map_err(|e| {
                    UpaymentsError::Validation(format!("invalid request body: {e}"))
                })?)
            }
            _ => None,
        };
        let request = HttpRequest {
            method,
            url: path.to_url(&self.base_url)?,
            headers: self.default_headers(),
            body,
        };
        let request_id = Uuid::new_v4();
        let request = &request;

        let response = retry_with_backoff(
            &self.retry,
            move |attempt| self.attempt(request, AttemptContext { request_id, attempt }),
            should_retry,
        )
        .await?;

        interpret(response)
    }

    async fn attempt(&self, request: &HttpRequest, ctx: AttemptContext) -> Result<RawResponse> {
        if let Some(logger) = &self.logger {
            logger.on_request(ctx, request);
        }

        let outcome = self.transport.send(request).await;

        if let Some(logger) = &self.logger {
            match &outcome {
                Ok(response) => logger.on_response(ctx, request, response),
                Err(error) => logger.on_error(ctx, request, error),
            }
        }
        outcome
    }

    fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_owned(), format!("Bearer {}", self.api_key.expose())),
            ("Accept".to_owned(), "application/json".to_owned()),
            ("Content-Type".to_owned(), "application/json".to_owned()),
        ]
    }
}

fn should_retry(outcome: &Result<RawResponse>) -> bool {
    match outcome {
        Ok(response) => is_retryable_status(response.status),
        Err(error) => is_retryable(error),
    }
}

/// Maps a completed exchange onto the response contract.
fn interpret(response: RawResponse) -> Result<ApiResponse> {
    let status = response.status;
    let decoded: Option<Value> = serde_json::from_slice(&response.body).ok();

    if response.is_success() {
        let Some(body) = decoded else {
            return Err(UpaymentsError::Transport {
                message: "Invalid JSON in gateway response".to_owned(),
                status: Some(status),
                source: None,
            });
        };
        return match ApiResponse::from_body(body) {
            Some(api) if api.status() => Ok(api),
            Some(api) => Err(api_error(status, api.into_raw())),
            None => Err(UpaymentsError::Transport {
                message: "Gateway response is missing the status field".to_owned(),
                status: Some(status),
                source: None,
            }),
        };
    }

    match decoded {
        Some(body)
            if (400..500).contains(&status)
                && body.get("status").is_some_and(|flag| !is_truthy(flag)) =>
        {
            Err(api_error(status, body))
        }
        decoded => Err(UpaymentsError::Transport {
            message: decoded
                .as_ref()
                .and_then(body_message)
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_owned()),
            status: Some(status),
            source: None,
        }),
    }
}

fn api_error(status: u16, body: Value) -> UpaymentsError {
    UpaymentsError::Api {
        message: body_message(&body).unwrap_or_else(|| GENERIC_API_MESSAGE.to_owned()),
        status,
        response: body,
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Mutex, PoisonError},
    };

    use serde_json::json;

    use super::*;
    use crate::{error::GENERIC_TRANSPORT_MESSAGE, transport::sealed};

    /// Transport replaying a fixed script of outcomes.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<RawResponse>>>,
        sent: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<RawResponse>>) -> Self {
            Self { script: Mutex::new(script.into()), sent: Mutex::default() }
        }

        fn sent(&self) -> Vec<HttpRequest> {
            self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }
    }

    impl sealed::private::Sealed for ScriptedTransport {}

    impl Transport for ScriptedTransport {
        async fn send<'a>(&'a self, request: &'a HttpRequest) -> Result<RawResponse> {
            self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());
            self.script
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Err(network_failure()))
        }

        fn protocol_name(&self) -> &'static str {
            "scripted"
        }
    }

    /// Logger recording event kinds.
    #[derive(Debug, Default)]
    struct RecordingLogger {
        events: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        fn record(&self, event: String) {
            self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
        }
    }

    impl RequestLogger for RecordingLogger {
        fn on_request(&self, ctx: AttemptContext, request: &HttpRequest) {
            self.record(format!("request#{} {} {}", ctx.attempt, request.method, request.url.path()));
        }

        fn on_response(&self, ctx: AttemptContext, _request: &HttpRequest, response: &RawResponse) {
            self.record(format!("response#{} {}", ctx.attempt, response.status));
        }

        fn on_error(&self, ctx: AttemptContext, _request: &HttpRequest, error: &dyn std::error::Error) {
            self.record(format!("error#{} {error}", ctx.attempt));
        }
    }

    fn network_failure() -> UpaymentsError {
        UpaymentsError::Transport {
            message: GENERIC_TRANSPORT_MESSAGE.to_owned(),
            status: None,
            source: None,
        }
    }

    fn respond(status: u16, body: &Value) -> Result<RawResponse> {
        Ok(RawResponse {
            status,
            headers: vec![("content-type".to_owned(), "application/json".to_owned())],
            body: serde_json::to_vec(body).unwrap(),
        })
    }

    fn client(script: Vec<Result<RawResponse>>) -> UpaymentsClient<ScriptedTransport> {
        let config = ClientConfig::new("e66a94d579cf75fba327ff716ad68c53aae11528")
            .with_retry(RetryPolicy::immediate(3));
        UpaymentsClient::with_transport(config, ScriptedTransport::new(script)).unwrap()
    }

    fn ok_body() -> Value {
        json!({"status": true, "data": {"is_refunded": true}})
    }

    #[tokio::test]
    async fn test_two_network_failures_then_success() {
        let client = client(vec![
            Err(network_failure()),
            Err(network_failure()),
            respond(200, &ok_body()),
        ]);

        let response = client.get_refund_status("ORD123").await.unwrap();

        assert_eq!(response.data_field("is_refunded"), Some(&json!(true)));
        assert_eq!(client.transport.sent().len(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_four_attempts() {
        let client = client(vec![
            respond(503, &json!({"message": "Service Unavailable"})),
            respond(503, &json!({"message": "Service Unavailable"})),
            respond(503, &json!({"message": "Service Unavailable"})),
            respond(503, &json!({"message": "Service Unavailable"})),
            respond(200, &ok_body()),
        ]);

        let err = client.check_payment_button_status().await.unwrap_err();

        assert!(matches!(err, UpaymentsError::Transport { status: Some(503), .. }));
        assert_eq!(err.to_string(), "Service Unavailable");
        assert_eq!(client.transport.sent().len(), 4);
    }

    #[tokio::test]
    async fn test_network_failure_exhausted() {
        let client = client(vec![]);
        let err = client.check_payment_button_status().await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_TRANSPORT_MESSAGE);
        assert!(err.status().is_none());
        assert_eq!(client.transport.sent().len(), 4);
    }

    #[tokio::test]
    async fn test_status_false_is_api_error_without_retry() {
        let body = json!({"status": false, "message": "X"});
        let client = client(vec![respond(200, &body)]);

        let err = client.get_payment_status("ORD123", PaymentLookup::TrackId).await.unwrap_err();

        match err {
            UpaymentsError::Api { message, status, response } => {
                assert_eq!(message, "X");
                assert_eq!(status, 200);
                assert_eq!(response, body);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert_eq!(client.transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_status_false_without_message_uses_generic_message() {
        let client = client(vec![respond(200, &json!({"status": false}))]);
        let err = client.check_payment_button_status().await.unwrap_err();
        assert_eq!(err.to_string(), GENERIC_API_MESSAGE);
    }

    #[tokio::test]
    async fn test_client_error_with_status_false_is_api_error() {
        let body = json!({"status": false, "message": "Invalid order id"});
        let client = client(vec![respond(422, &body)]);

        let err = client.get_refund_status("ORD123").await.unwrap_err();

        assert!(matches!(err, UpaymentsError::Api { status: 422, .. }));
        assert_eq!(err.to_string(), "Invalid order id");
        assert_eq!(client.transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_client_error_without_envelope_is_transport_error() {
        let client = client(vec![respond(401, &json!({"message": "Unauthenticated."}))]);
        let err = client.check_payment_button_status().await.unwrap_err();
        assert!(matches!(err, UpaymentsError::Transport { status: Some(401), .. }));
        assert_eq!(err.to_string(), "Unauthenticated.");
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_unknown_error() {
        let client = client(vec![Ok(RawResponse {
            status: 404,
            headers: vec![],
            body: b"<html>Not Found</html>".to_vec(),
        })]);
        let err = client.check_payment_button_status().await.unwrap_err();
        assert!(matches!(err, UpaymentsError::Transport { status: Some(404), .. }));
        assert_eq!(err.to_string(), UNKNOWN_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_success_without_status_is_transport_error() {
        let client = client(vec![respond(200, &json!({"data": {}}))]);
        let err = client.check_payment_button_status().await.unwrap_err();
        assert!(matches!(err, UpaymentsError::Transport { status: Some(200), .. }));

        let client = self::client(vec![Ok(RawResponse {
            status: 200,
            headers: vec![],
            body: b"OK".to_vec(),
        })]);
        let err = client.check_payment_button_status().await.unwrap_err();
        assert!(matches!(err, UpaymentsError::Transport { status: Some(200), .. }));
    }

    #[tokio::test]
    async fn test_request_headers_and_url() {
        let client = client(vec![respond(200, &ok_body())]);
        client.get_payment_status("ORD123", PaymentLookup::InvoiceId).await.unwrap();

        let sent = client.transport.sent();
        let request = &sent[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.url.as_str(),
            "https://sandboxapi.upayments.com/api/v1/get-payment-status?invoice_id=ORD123"
        );
        assert!(request.body.is_none());
        assert!(request.headers.contains(&(
            "Authorization".to_owned(),
            "Bearer e66a94d579cf75fba327ff716ad68c53aae11528".to_owned()
        )));
        assert!(request.headers.contains(&("Accept".to_owned(), "application/json".to_owned())));
        assert!(
            request.headers.contains(&("Content-Type".to_owned(), "application/json".to_owned()))
        );
    }

    #[tokio::test]
    async fn test_empty_body_is_not_sent() {
        let client = client(vec![respond(200, &ok_body())]);
        let path = client.endpoints().path(Operation::CheckPaymentButtonStatus);

        client.send(Method::POST, &path, Some(&ParameterSet::new())).await.unwrap();

        assert!(client.transport.sent()[0].body.is_none());
    }

    #[tokio::test]
    async fn test_create_refund_body() {
        let client = client(vec![respond(200, &json!({"status": true, "data": {"refund_id": "REF123"}}))]);
        let options = RefundOptions::default().with_customer_first_name("John").with_reference("REF12345");

        let response = client.create_refund("ORD123", 50.0, options).await.unwrap();
        assert_eq!(response.data_str("refund_id"), Some("REF123"));

        let sent: Value = serde_json::from_slice(client.transport.sent()[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(
            sent,
            json!({"orderId": "ORD123", "totalPrice": 50.0, "customerFirstName": "John", "reference": "REF12345"})
        );
    }

    #[tokio::test]
    async fn test_validation_errors_skip_network() {
        let client = client(vec![]);

        assert!(client.create_refund("", 10.0, RefundOptions::default()).await.unwrap_err().is_validation());
        assert!(client.create_customer_unique_token("").await.unwrap_err().is_validation());
        assert!(client.add_card("", "CUST1").await.unwrap_err().is_validation());
        assert!(client.retrieve_customer_cards("").await.unwrap_err().is_validation());
        assert!(client.delete_multi_vendor_refund("INV", "ORD", "", "ARN").await.unwrap_err().is_validation());
        assert!(client.get_payment_status("", PaymentLookup::TrackId).await.unwrap_err().is_validation());
        assert!(client.create_payment(&client.request_builder()).await.unwrap_err().is_validation());

        assert!(client.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_create_payment_uses_client_profile() {
        let config = ClientConfig::new("key")
            .with_base_url("https://sandboxapi.upayments.com/api/v1")
            .with_profile(crate::profile::ProfileName::Legacy);
        let client =
            UpaymentsClient::with_transport(config, ScriptedTransport::new(vec![respond(200, &ok_body())]))
                .unwrap();

        let builder = RequestBuilder::default()
            .set_order(json!({
                "id": "ORD123",
                "description": "Order Description",
                "currency": "KWD",
                "amount": 100.0
            }))
            .unwrap()
            .set_return_url("https://example.com/return")
            .set_cancel_url("https://example.com/cancel")
            .set_notification_url("https://example.com/notify");

        let err = client.create_payment(&builder).await.unwrap_err();
        assert_eq!(err.to_string(), "The field 'reference' is required.");
        assert!(client.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_logger_sees_every_attempt() {
        let logger = Arc::new(RecordingLogger::default());
        let client = client(vec![Err(network_failure()), respond(200, &ok_body())])
            .with_logger(Arc::clone(&logger) as Arc<dyn RequestLogger>);

        client.check_single_refund_status("REF123").await.unwrap();

        assert_eq!(
            logger.events(),
            [
                "request#0 GET /api/v1/check-refund-status/REF123".to_owned(),
                format!("error#0 {GENERIC_TRANSPORT_MESSAGE}"),
                "request#1 GET /api/v1/check-refund-status/REF123".to_owned(),
                "response#1 200".to_owned(),
            ]
        );
    }

    #[test]
    fn test_logging_disabled_by_config() {
        let config = ClientConfig::new("key").with_logging(false, "stack");
        let client = UpaymentsClient::with_transport(config, ScriptedTransport::default()).unwrap();
        assert!(client.logger.is_none());

        let client = self::client(vec![]);
        assert!(client.logger.is_some());
        assert!(client.without_logging().logger.is_none());
    }

    #[test]
    fn test_with_transport_rejects_invalid_config() {
        let result = UpaymentsClient::with_transport(ClientConfig::new(""), ScriptedTransport::default());
        assert!(matches!(result, Err(UpaymentsError::Config(_))));
    }

    #[test]
    fn test_legacy_profile_uses_base_url_path() {
        let config = ClientConfig::new("key")
            .with_base_url("https://sandboxapi.upayments.com/api/v1")
            .with_profile(crate::profile::ProfileName::Legacy);
        let client = UpaymentsClient::with_transport(config, ScriptedTransport::default()).unwrap();

        let url = client
            .endpoints()
            .path_with_id(Operation::GetRefundStatus, "ORD123")
            .to_url(client.base_url())
            .unwrap();
        assert_eq!(url.as_str(), "https://sandboxapi.upayments.com/api/v1/check-refund/ORD123");
        assert!(client.request_builder().set_payment_gateway("any-gateway").is_ok());
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UpaymentsClient>();
    }
}
