//! Required-field checks shared by the request builder and the client.
//!
//! The gateway's reference clients treat a field as missing when it is absent
//! *or* holds an "empty" value. Which values count as empty is controlled by
//! [`RequiredFieldPolicy`].

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Result, UpaymentsError};

/// Rule deciding whether a present value satisfies a required field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredFieldPolicy {
    /// Loose truthiness: `null`, `false`, numeric zero, `""`, `"0"`, `[]`
    /// and `{}` are all treated as missing.
    ///
    /// This rejects legitimate zero amounts and is kept for compatibility
    /// with existing integrations.
    #[default]
    Truthy,
    /// Presence only: `null` and blank strings are missing, every other value
    /// (including `0` and `false`) is accepted.
    Present,
}

impl RequiredFieldPolicy {
    /// Returns `true` if `value` counts as empty under this policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use upayments::validation::RequiredFieldPolicy;
    ///
    /// assert!(RequiredFieldPolicy::Truthy.is_empty(&json!(0)));
    /// assert!(!RequiredFieldPolicy::Present.is_empty(&json!(0)));
    /// ```
    #[must_use]
    pub fn is_empty(self, value: &Value) -> bool {
        match self {
            Self::Truthy => !is_truthy(value),
            Self::Present => match value {
                Value::Null => true,
                Value::String(s) => s.trim().is_empty(),
                _ => false,
            },
        }
    }

    /// Checks that every field in `required` is present and non-empty in
    /// `fields`.
    ///
    /// Fields are checked in order and the first missing one is reported.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] naming the first missing field.
    pub fn require_fields<S: AsRef<str>>(
        self,
        fields: &Map<String, Value>,
        required: &[S],
    ) -> Result<()> {
        for field in required {
            let field = field.as_ref();
            let missing = fields.get(field).is_none_or(|value| self.is_empty(value));
            if missing {
                return Err(missing_field(field));
            }
        }
        Ok(())
    }

    /// Like [`require_fields`](Self::require_fields), but the input must be a
    /// JSON object first.
    ///
    /// # Errors
    ///
    /// Returns [`UpaymentsError::Validation`] if `value` is not an object or a
    /// required field is missing.
    pub fn require_object<'v, S: AsRef<str>>(
        self,
        what: &str,
        value: &'v Value,
        required: &[S],
    ) -> Result<&'v Map<String, Value>> {
        let Value::Object(fields) = value else {
            return Err(UpaymentsError::Validation(format!("The {what} data must be an object.")));
        };
        self.require_fields(fields, required)?;
        Ok(fields)
    }
}

/// Loose truthiness over JSON values.
///
/// Mirrors the gateway's reference semantics: the string `"0"` is falsy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Builds the standard "field is required" validation error.
pub fn missing_field(field: &str) -> UpaymentsError {
    UpaymentsError::Validation(format!("The field '{field}' is required."))
}

/// Rejects empty string arguments with the given message.
///
/// # Errors
///
/// Returns [`UpaymentsError::Validation`] with `message` if any value is empty.
pub fn require_non_empty(values: &[&str], message: &str) -> Result<()> {
    if values.iter().any(|value| value.is_empty()) {
        return Err(UpaymentsError::Validation(message.to_owned()));
    }
    Ok(())
}
