//! UPayments: async client for the UPayments hosted payment gateway.
//!
//! The crate builds JSON payloads for charges, refunds, multi-vendor refunds
//! and card tokenization, validates them locally, and sends them to the
//! gateway with bearer authentication, bounded retry and optional request
//! logging.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   chained, consuming calls
//! │  RequestBuilder  │   order, customer, gateway, vendors, URLs
//! └────────┬─────────┘
//!          │ ParameterSet (ordered JSON)
//! ┌────────▼─────────┐
//! │  UpaymentsClient │   endpoint table, profile, retry, logger
//! └────────┬─────────┘
//!          │ one HttpRequest per attempt
//! ┌────────▼─────────┐
//! │  HttpTransport   │   reqwest, pooled connections
//! └────────┬─────────┘
//!          │ HTTPS + Authorization: Bearer
//! ┌────────▼─────────┐
//! │ UPayments API    │   {status, data, message}
//! └──────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Create a Payment Link
//!
//! ```rust,no_run
//! use serde_json::json;
//! use upayments::UpaymentsClient;
//!
//! # async fn example() -> upayments::Result<()> {
//! // Reads UPAYMENTS_API_KEY, UPAYMENTS_API_URL, ...
//! let client = UpaymentsClient::from_env()?;
//!
//! let builder = client
//!     .request_builder()
//!     .add_product("Test Product", "Description", 100.0, 1)
//!     .set_order(json!({
//!         "id": "ORD123",
//!         "description": "Order Description",
//!         "currency": "KWD",
//!         "amount": 100.0
//!     }))?
//!     .set_customer(json!({
//!         "uniqueId": "CUST123",
//!         "name": "John Doe",
//!         "email": "john.doe@example.com",
//!         "mobile": "+96512345678"
//!     }))?
//!     .set_payment_gateway("knet")?
//!     .set_return_url("https://example.com/return")
//!     .set_cancel_url("https://example.com/cancel")
//!     .set_notification_url("https://example.com/notify");
//!
//! let response = client.create_payment(&builder).await?;
//! println!("Payment link: {:?}", response.data_str("link"));
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Check a Payment
//!
//! ```rust,no_run
//! use upayments::{PaymentLookup, UpaymentsClient};
//!
//! # async fn example(client: UpaymentsClient) -> upayments::Result<()> {
//! let by_track = client.get_payment_status("TRACK123", PaymentLookup::TrackId).await?;
//! let by_invoice = client.get_payment_status("INV123", PaymentLookup::InvoiceId).await?;
//! println!("{:?} / {:?}", by_track.data(), by_invoice.data());
//! # Ok(())
//! # }
//! ```
//!
//! ## 3. Refund Across Vendors
//!
//! ```rust,no_run
//! use serde_json::json;
//! use upayments::{MultiVendorRefundOptions, UpaymentsClient};
//!
//! # async fn example(client: UpaymentsClient) -> upayments::Result<()> {
//! let builder = client.request_builder().add_refund_vendor(json!({
//!     "refundRequestId": "REF123",
//!     "ibanNumber": "KW91KFHO0000000000051010173254",
//!     "totalPaid": "100.0",
//!     "refundedAmount": 1.0,
//!     "remainingLimit": 100.0,
//!     "amountToRefund": 10.0,
//!     "merchantType": "vendor"
//! }))?;
//!
//! let response = client
//!     .create_multi_vendor_refund(&builder, "ORD123", &MultiVendorRefundOptions::default())
//!     .await?;
//! println!("Refund: {:?}", response.data_str("refund_id"));
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`builder`]: request builder and the [`ParameterSet`] type
//! - [`client`]: gateway operations, retry, response interpretation
//! - [`config`]: environment and TOML configuration
//! - [`endpoint`]: operation paths and per-operation overrides
//! - [`profile`]: `standard` and `legacy` validation profiles
//! - [`requests`]: refund and card request bodies
//! - [`response`]: decoded gateway envelope
//! - [`transport`]: single-attempt HTTP transport
//! - [`reliability`]: exponential backoff retry
//! - [`logging`]: request/response logging
//! - [`validation`]: required-field rules
//! - [`error`]: error taxonomy
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`](error::Result):
//!
//! ```rust,no_run
//! use upayments::{UpaymentsClient, UpaymentsError};
//!
//! # async fn example(client: UpaymentsClient) {
//! match client.get_refund_status("ORD123").await {
//!     Ok(response) => println!("Refunded: {:?}", response.data_field("is_refunded")),
//!     Err(UpaymentsError::Validation(msg)) => eprintln!("Fix the input: {msg}"),
//!     Err(UpaymentsError::Api { message, .. }) => eprintln!("Gateway declined: {message}"),
//!     Err(UpaymentsError::Transport { message, status, .. }) => {
//!         eprintln!("Gateway unreachable ({status:?}): {message}");
//!     }
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions, reason = "transitive dependencies from reqwest")]

pub mod builder;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod profile;
pub mod reliability;
pub mod requests;
pub mod response;
pub mod transport;
pub mod validation;

pub use builder::{ParameterSet, RequestBuilder};
pub use client::UpaymentsClient;
pub use config::{ClientConfig, LoggingConfig};
pub use endpoint::{Operation, PaymentLookup};
pub use error::{Result, UpaymentsError};
pub use profile::{ApiProfile, ProfileName};
pub use requests::{MultiVendorRefundOptions, RefundOptions};
pub use response::ApiResponse;
pub use validation::RequiredFieldPolicy;
