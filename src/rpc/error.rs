use super::USER_REJECTED_REQUEST;
use serde::{Deserialize, Serialize};
use serde_aux::prelude::deserialize_number_from_string;
use serde_json::Value;

/// Errors raised by a single call into the injected provider.
///
/// None of these cross the connector boundary directly. The connector turns
/// them into fallback attempts, absent values, or [`crate::Error::UserRejected`].
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ProviderError {
    /// The provider rejected the request with an RPC-style error object.
    #[error("Provider error {}: {}", .0.code, .0.message)]
    Rpc(ErrorData),

    /// The provider object does not expose the member we tried to call.
    #[error("Provider has no `{0}` member")]
    MissingMember(&'static str),

    /// A JS exception without the shape of a provider error.
    #[error("JS error: {0}")]
    Js(String),

    /// A value could not be moved between JS and Rust.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl ProviderError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc(ErrorData { code, message: message.into(), data: None })
    }

    /// The numeric code, if the provider attached one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc(data) => Some(data.code),
            _ => None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code() == Some(USER_REJECTED_REQUEST)
    }
}

/// Reads an error `code` sent either as a number or as a numeric string.
pub fn error_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|n| n as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for ProviderError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Error object as rejected by EIP-1193 providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorData {
    /// Error code.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub code: i64,

    /// Error message.
    #[serde(default)]
    pub message: String,

    /// Error data, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
