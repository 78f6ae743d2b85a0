//! Decoded gateway responses.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{Result, UpaymentsError},
    validation::is_truthy,
};

/// A successful gateway response.
///
/// The gateway wraps every payload as `{status, data?, message?}`. Values are
/// kept as JSON so fields the gateway adds later are never lost.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use upayments::ApiResponse;
///
/// let response = ApiResponse::from_body(json!({
///     "status": true,
///     "data": {"payment_link": "https://example.com"}
/// }))
/// .unwrap();
///
/// assert!(response.status());
/// assert_eq!(response.data_str("payment_link"), Some("https://example.com"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: bool,
    raw: Value,
}

impl ApiResponse {
    /// Wraps a decoded body.
    ///
    /// Returns `None` if the body is not an object carrying `status`.
    #[must_use]
    pub fn from_body(raw: Value) -> Option<Self> {
        let status = is_truthy(raw.as_object()?.get("status")?);
        Some(Self { status, raw })
    }

    /// The `status` flag, under loose truthiness.
    #[must_use]
    pub fn status(&self) -> bool {
        self.status
    }

    /// The `data` member, if present.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.raw.get("data")
    }

    /// A member of `data`.
    #[must_use]
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data()?.get(key)
    }

    /// A string member of `data`.
    #[must_use]
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data_field(key)?.as_str()
    }

    /// Deserializes `data` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Transport`] if `data` is absent or does not
    /// match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.data().cloned().unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| UpaymentsError::Transport {
            message: format!("Unexpected response data: {e}"),
            status: None,
            source: None,
        })
    }

    /// The `message` member, if present.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.raw.get("message")?.as_str()
    }

    /// Looks up a value by JSON pointer, e.g. `/data/customerCards/0/number`.
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.raw.pointer(pointer)
    }

    /// The full decoded body.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consumes the response, returning the decoded body.
    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }
}

/// Extracts a human-readable `message` from an error body.
pub(crate) fn body_message(body: &Value) -> Option<String> {
    match body.get("message")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_body_requires_status() {
        assert!(ApiResponse::from_body(json!({"data": {}})).is_none());
        assert!(ApiResponse::from_body(json!([1, 2])).is_none());
        assert!(ApiResponse::from_body(json!("ok")).is_none());
    }

    #[test]
    fn test_status_truthiness() {
        assert!(ApiResponse::from_body(json!({"status": true})).unwrap().status());
        assert!(ApiResponse::from_body(json!({"status": 1})).unwrap().status());
        assert!(!ApiResponse::from_body(json!({"status": "0"})).unwrap().status());
        assert!(!ApiResponse::from_body(json!({"status": null})).unwrap().status());
    }

    #[test]
    fn test_accessors() {
        let response = ApiResponse::from_body(json!({
            "status": true,
            "message": "Refund deleted successfully",
            "data": {"customerCards": [{"number": "512345xxxxxx0008"}], "is_refunded": true}
        }))
        .unwrap();

        assert_eq!(response.message(), Some("Refund deleted successfully"));
        assert_eq!(response.data_field("is_refunded"), Some(&json!(true)));
        assert_eq!(
            response.pointer("/data/customerCards/0/number").and_then(Value::as_str),
            Some("512345xxxxxx0008")
        );
        assert_eq!(response.raw()["status"], json!(true));
    }

    #[test]
    fn test_data_as() {
        #[derive(Deserialize)]
        struct Refund {
            refund_id: String,
        }

        let response =
            ApiResponse::from_body(json!({"status": true, "data": {"refund_id": "REF123"}}))
                .unwrap();
        let refund: Refund = response.data_as().unwrap();
        assert_eq!(refund.refund_id, "REF123");

        let empty = ApiResponse::from_body(json!({"status": true})).unwrap();
        assert!(empty.data_as::<Refund>().is_err());
    }

    #[test]
    fn test_body_message() {
        assert_eq!(body_message(&json!({"message": "X"})), Some("X".to_owned()));
        assert_eq!(body_message(&json!({"message": ["a"]})), Some(r#"["a"]"#.to_owned()));
        assert_eq!(body_message(&json!({"message": null})), None);
        assert_eq!(body_message(&json!({})), None);
    }
}
