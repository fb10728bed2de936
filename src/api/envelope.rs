//! Backend response envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope `code` that marks a successful call
pub const SUCCESS_CODE: i64 = 200;

/// Every backend response is wrapped as `{code, message, data}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: "success".to_string(),
            data,
        }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// The message, or `fallback` when the backend sent none
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.message.trim().is_empty() {
            fallback
        } else {
            &self.message
        }
    }
}
