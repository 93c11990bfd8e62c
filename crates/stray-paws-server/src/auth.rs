// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::http::HeaderMap;
use stray_paws_api::ApiError;
use stray_paws_model::{Role, UserAccount};
use stray_paws_store::StoreError;
use tracing::warn;

/// Authenticated caller, resolved from the opaque bearer token. Token issuance is an
/// external collaborator; this only maps token -> account.
pub(crate) struct AuthedUser {
    pub account: UserAccount,
}

impl AuthedUser {
    pub(crate) fn is_admin(&self) -> bool {
        self.account.role == Role::Admin
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub(crate) async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthedUser, ApiError> {
    let token = bearer_token(headers).ok_or_else(ApiError::unauthorized)?;
    let user_id = match state.store.resolve_session(token).await {
        Ok(id) => id,
        Err(StoreError::NotFound) => return Err(ApiError::unauthorized()),
        Err(err) => {
            warn!(error = %err, "session resolution failed");
            return Err(ApiError::store_unavailable());
        }
    };
    match state.store.account_by_id(&user_id).await {
        Ok(account) => Ok(AuthedUser { account }),
        // A token for a vanished account is indistinguishable from a bad token.
        Err(StoreError::NotFound) => Err(ApiError::unauthorized()),
        Err(err) => {
            warn!(error = %err, "account load failed during auth");
            Err(ApiError::store_unavailable())
        }
    }
}

pub(crate) fn require_admin(user: &AuthedUser) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}
