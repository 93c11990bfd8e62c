// SPDX-License-Identifier: Apache-2.0

//! Order endpoints: placement, listing, status workflow, deletion.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde_json::json;
use stray_paws_api::{ApiError, ApiErrorCode, PlaceOrderRequest, UpdateOrderStatusRequest};
use stray_paws_model::{unix_millis, OrderId, OrderStatus};

use crate::auth::{authenticate, require_admin};
use crate::http::handlers::{ok_json, parse_body, store_failure, ApiResult};
use crate::services::placement;
use crate::AppState;

pub(crate) async fn place_order_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    let req: PlaceOrderRequest = parse_body(&body)?;
    let order_id = OrderId::parse(&state.mint_id("ord"))
        .map_err(|_| ApiError::internal())?;
    let placed = placement::place_order(
        state.store.as_ref(),
        &state.api.lookup_retry(),
        order_id,
        user.account.id,
        &req,
    )
    .await?;
    Ok(ok_json(json!({
        "success": true,
        "message": "Order placed successfully",
        "orderId": &placed.order.id,
        "order": &placed.order,
        "balance": placed.new_balance,
    })))
}

pub(crate) async fn list_all_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    require_admin(&user)?;
    let orders = state
        .store
        .list_orders()
        .await
        .map_err(|e| store_failure("list_orders", e, ApiError::internal()))?;
    Ok(ok_json(json!({"success": true, "orders": orders})))
}

pub(crate) async fn list_mine_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    let orders = state
        .store
        .orders_for_user(&user.account.id)
        .await
        .map_err(|e| store_failure("orders_for_user", e, ApiError::internal()))?;
    Ok(ok_json(json!({"success": true, "orders": orders})))
}

pub(crate) async fn update_status_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    require_admin(&user)?;
    let order_id = OrderId::parse(&id)
        .map_err(|_| ApiError::not_found(ApiErrorCode::OrderNotFound, "order"))?;
    let req: UpdateOrderStatusRequest = parse_body(&body)?;
    let raw = req
        .status
        .as_deref()
        .ok_or_else(|| ApiError::missing_field("status"))?;
    let status = OrderStatus::parse(raw).map_err(|_| {
        ApiError::validation(format!(
            "unknown status {raw:?}; expected one of Pending, Out for Delivery, Delivered"
        ))
    })?;
    let order = state
        .store
        .update_order_status(&order_id, status, unix_millis())
        .await
        .map_err(|e| {
            store_failure(
                "update_order_status",
                e,
                ApiError::not_found(ApiErrorCode::OrderNotFound, "order"),
            )
        })?;
    Ok(ok_json(json!({"success": true, "order": order})))
}

pub(crate) async fn delete_order_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    require_admin(&user)?;
    let order_id = OrderId::parse(&id)
        .map_err(|_| ApiError::not_found(ApiErrorCode::OrderNotFound, "order"))?;
    // Deletion is administrative cleanup; the owner's ledger is not refunded.
    state.store.delete_order(&order_id).await.map_err(|e| {
        store_failure(
            "delete_order",
            e,
            ApiError::not_found(ApiErrorCode::OrderNotFound, "order"),
        )
    })?;
    Ok(ok_json(json!({"success": true, "message": "Order deleted"})))
}
