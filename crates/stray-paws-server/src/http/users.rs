// SPDX-License-Identifier: Apache-2.0

//! Account endpoints: registration and the authenticated self view.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::json;
use stray_paws_api::{require_str, ApiError, RegisterRequest};
use stray_paws_model::{sha256_hex, unix_millis, Role, UserAccount, UserId, EMAIL_MAX_LEN};
use tracing::info;

use crate::auth::authenticate;
use crate::http::handlers::{account_public_json, ok_json, parse_body, store_failure, ApiResult};
use crate::AppState;

pub(crate) async fn register_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult {
    let req: RegisterRequest = parse_body(&body)?;
    let name = require_str(&req.name, "name")?.to_string();
    let email = require_str(&req.email, "email")?.to_lowercase();
    if email.len() > EMAIL_MAX_LEN || !email.contains('@') {
        return Err(ApiError::validation("email is not a valid address").into());
    }
    let password = require_str(&req.password, "password")?;
    if password.len() < 8 {
        return Err(ApiError::validation("password must be at least 8 characters").into());
    }
    // Self-service registration never grants admin.
    let role = match req.role.as_deref().map(str::trim) {
        None | Some("") | Some("donor") => Role::Donor,
        Some("volunteer") => Role::Volunteer,
        Some(other) => {
            return Err(ApiError::validation(format!("unknown role {other:?}")).into());
        }
    };
    let id = UserId::parse(&state.mint_id("usr")).map_err(|_| ApiError::internal())?;
    let account = UserAccount::registered(
        id,
        name,
        email,
        sha256_hex(password.as_bytes()),
        role,
        unix_millis(),
    );
    state.store.create_account(&account).await.map_err(|e| {
        store_failure("create_account", e, ApiError::internal())
    })?;
    info!(user_id = %account.id, role = %account.role.as_str(), "account registered");
    Ok(ok_json(json!({
        "success": true,
        "user": account_public_json(&account),
    })))
}

pub(crate) async fn me_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    Ok(ok_json(json!({
        "success": true,
        "user": account_public_json(&user.account),
    })))
}
