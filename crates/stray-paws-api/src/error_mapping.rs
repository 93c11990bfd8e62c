// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

/// HTTP status for an error body. The original surface used only 400/404/500; the
/// enumerated codes keep those buckets and add the conventional auth and conflict
/// statuses for the routes that need them.
#[must_use]
pub fn map_error(error: &ApiError) -> u16 {
    match error.code {
        ApiErrorCode::ValidationFailed
        | ApiErrorCode::MissingField
        | ApiErrorCode::InsufficientFunds => 400,
        ApiErrorCode::Unauthorized => 401,
        ApiErrorCode::Forbidden => 403,
        ApiErrorCode::UserNotFound
        | ApiErrorCode::ProductNotFound
        | ApiErrorCode::OrderNotFound
        | ApiErrorCode::TeamNotFound
        | ApiErrorCode::InvitationNotFound => 404,
        ApiErrorCode::Conflict => 409,
        ApiErrorCode::StoreUnavailable => 503,
        ApiErrorCode::Internal => 500,
    }
}
