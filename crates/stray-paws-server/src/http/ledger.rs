// SPDX-License-Identifier: Apache-2.0

//! PetPoints ledger endpoint. Payment settlement happens upstream; this only
//! records the credit against the caller's balance.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::json;
use stray_paws_api::{require_positive, ApiError, ApiErrorCode, LoadPointsRequest};
use tracing::info;

use crate::auth::authenticate;
use crate::http::handlers::{ok_json, parse_body, store_failure, ApiResult};
use crate::AppState;

pub(crate) async fn load_points_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    let req: LoadPointsRequest = parse_body(&body)?;
    let amount = require_positive(req.amount, "amount")?;
    let balance = state
        .store
        .credit_points(&user.account.id, amount, req.payment_reference.as_deref())
        .await
        .map_err(|e| {
            store_failure(
                "credit_points",
                e,
                ApiError::not_found(ApiErrorCode::UserNotFound, "user"),
            )
        })?;
    info!(user_id = %user.account.id, amount, balance, "points credited");
    Ok(ok_json(json!({"success": true, "balance": balance})))
}
