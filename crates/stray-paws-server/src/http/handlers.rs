// SPDX-License-Identifier: Apache-2.0

use crate::{AppState, CRATE_NAME};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use stray_paws_api::{map_error, ApiError, API_VERSION};
use stray_paws_model::UserAccount;
use stray_paws_store::StoreError;
use tracing::{error, warn};

/// Local wrapper so handlers can `?` an [`ApiError`] straight into a response.
pub(crate) struct Failure(pub ApiError);

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        api_error_response(&self.0)
    }
}

pub(crate) type ApiResult = Result<Response, Failure>;

pub(crate) fn api_error_response(err: &ApiError) -> Response {
    let status =
        StatusCode::from_u16(map_error(err)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut body = json!({
        "success": false,
        "code": err.code,
        "message": err.message,
    });
    if !err.details.is_null() {
        body["details"] = err.details.clone();
    }
    (status, Json(body)).into_response()
}

pub(crate) fn ok_json(payload: Value) -> Response {
    Json(payload).into_response()
}

pub(crate) fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("invalid json body: {e}")))
}

/// Map a storage failure onto the wire taxonomy. Raw upstream causes go to the log,
/// never to the client.
pub(crate) fn store_failure(context: &'static str, err: StoreError, not_found: ApiError) -> ApiError {
    match err {
        StoreError::NotFound => not_found,
        StoreError::InsufficientFunds { balance, required } => {
            ApiError::insufficient_funds(balance, required)
        }
        StoreError::DuplicateKey(key) => ApiError::conflict(format!("duplicate key: {key}")),
        StoreError::Unavailable(cause) => {
            warn!(context, error = %cause, "store unavailable");
            ApiError::store_unavailable()
        }
        StoreError::Corrupt(cause) => {
            error!(context, error = %cause, "stored document corrupt");
            ApiError::internal()
        }
        // StoreError is non-exhaustive; new variants fail closed.
        err => {
            error!(context, error = %err, "unhandled store error");
            ApiError::internal()
        }
    }
}

/// Client-facing account view. The credential hash never leaves the server.
pub(crate) fn account_public_json(account: &UserAccount) -> Value {
    json!({
        "id": account.id,
        "displayName": account.display_name,
        "email": account.email,
        "role": account.role,
        "balance": account.balance,
        "location": account.location,
        "bio": account.bio,
        "createdAt": account.created_at_ms,
    })
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    let store_ready = if state.api.readiness_requires_store {
        // NotFound still proves the store answered the probe.
        match state.store.resolve_session("readyz-probe").await {
            Ok(_) | Err(StoreError::NotFound) => true,
            Err(_) => false,
        }
    } else {
        true
    };
    if state.ready.load(std::sync::atomic::Ordering::Relaxed) && store_ready {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready").into_response()
    }
}

pub(crate) async fn version_handler() -> impl IntoResponse {
    let payload = json!({
        "name": CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": API_VERSION,
        "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
    });
    let mut response = Json(payload).into_response();
    if let Ok(value) = HeaderValue::from_str("public, max-age=30") {
        response.headers_mut().insert("cache-control", value);
    }
    response
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = state.metrics.render().await;
    let mut response = (StatusCode::OK, body).into_response();
    response.headers_mut().insert(
        "content-type",
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    response
}
