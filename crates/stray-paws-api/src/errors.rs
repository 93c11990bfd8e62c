// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Enumerated error kinds surfaced to clients alongside the human-readable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    MissingField,
    Unauthorized,
    Forbidden,
    UserNotFound,
    ProductNotFound,
    OrderNotFound,
    TeamNotFound,
    InvitationNotFound,
    InsufficientFunds,
    Conflict,
    StoreUnavailable,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::MissingField => "missing_field",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::UserNotFound => "user_not_found",
            Self::ProductNotFound => "product_not_found",
            Self::OrderNotFound => "order_not_found",
            Self::TeamNotFound => "team_not_found",
            Self::InvitationNotFound => "invitation_not_found",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Conflict => "conflict",
            Self::StoreUnavailable => "store_unavailable",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn missing_field(name: &str) -> Self {
        Self::new(
            ApiErrorCode::MissingField,
            format!("missing required field: {name}"),
            json!({"field": name}),
        )
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ValidationFailed, message, Value::Null)
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(
            ApiErrorCode::Unauthorized,
            "missing or unrecognized bearer token",
            Value::Null,
        )
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(
            ApiErrorCode::Forbidden,
            "administrator role required",
            Value::Null,
        )
    }

    #[must_use]
    pub fn insufficient_funds(balance: i64, required: i64) -> Self {
        Self::new(
            ApiErrorCode::InsufficientFunds,
            "insufficient point balance",
            json!({"balance": balance, "required": required}),
        )
    }

    #[must_use]
    pub fn not_found(code: ApiErrorCode, what: &str) -> Self {
        Self::new(code, format!("{what} not found"), Value::Null)
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Conflict, message, Value::Null)
    }

    /// Upstream storage failed. The raw cause goes to the log at the call site,
    /// never into the response body.
    #[must_use]
    pub fn store_unavailable() -> Self {
        Self::new(
            ApiErrorCode::StoreUnavailable,
            "storage temporarily unavailable",
            Value::Null,
        )
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::new(ApiErrorCode::Internal, "internal error", Value::Null)
    }
}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
};
