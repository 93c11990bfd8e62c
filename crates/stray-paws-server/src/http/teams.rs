// SPDX-License-Identifier: Apache-2.0

//! Volunteer team endpoints: creation, invitations, and invitation responses.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde_json::json;
use stray_paws_api::{
    require_str, ApiError, ApiErrorCode, InviteRequest, InviteRespondRequest, TeamCreateRequest,
};
use stray_paws_model::{
    unix_millis, Invitation, InvitationId, InvitationStatus, Team, TeamId, UserAccount, UserId,
};
use tracing::info;

use crate::auth::authenticate;
use crate::http::handlers::{ok_json, parse_body, store_failure, ApiResult};
use crate::AppState;

fn team_not_found() -> ApiError {
    ApiError::not_found(ApiErrorCode::TeamNotFound, "team")
}

fn invitation_not_found() -> ApiError {
    ApiError::not_found(ApiErrorCode::InvitationNotFound, "invitation")
}

pub(crate) async fn create_team_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    let req: TeamCreateRequest = parse_body(&body)?;
    let name = require_str(&req.name, "name")?.to_string();
    let id = TeamId::parse(&state.mint_id("team")).map_err(|_| ApiError::internal())?;
    let team = Team::created(id, name, user.account.id, unix_millis());
    state
        .store
        .create_team(&team)
        .await
        .map_err(|e| store_failure("create_team", e, ApiError::internal()))?;
    info!(team_id = %team.id, creator = %team.creator, "team created");
    Ok(ok_json(json!({"success": true, "team": team})))
}

/// Recipient may be given as an email address or a user id.
async fn resolve_recipient(state: &AppState, raw: &str) -> Result<UserAccount, ApiError> {
    let lookup = if raw.contains('@') {
        state.store.account_by_email(&raw.to_lowercase()).await
    } else {
        let id = UserId::parse(raw).map_err(|e| ApiError::validation(e.to_string()))?;
        state.store.account_by_id(&id).await
    };
    lookup.map_err(|e| {
        store_failure(
            "resolve_recipient",
            e,
            ApiError::not_found(ApiErrorCode::UserNotFound, "user"),
        )
    })
}

pub(crate) async fn invite_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    let team_id = TeamId::parse(&id).map_err(|_| team_not_found())?;
    let req: InviteRequest = parse_body(&body)?;
    let recipient = resolve_recipient(&state, require_str(&req.recipient, "recipient")?).await?;
    let team = state
        .store
        .team_by_id(&team_id)
        .await
        .map_err(|e| store_failure("team_by_id", e, team_not_found()))?;
    if !team.is_member(&user.account.id) {
        return Err(ApiError::forbidden().into());
    }
    if team.is_member(&recipient.id) {
        return Err(ApiError::conflict("recipient is already a member").into());
    }
    let invitation_id =
        InvitationId::parse(&state.mint_id("inv")).map_err(|_| ApiError::internal())?;
    let invitation = Invitation::sent(
        invitation_id,
        team.id.clone(),
        user.account.id,
        recipient.id,
        unix_millis(),
    );
    state
        .store
        .create_invitation(&invitation)
        .await
        .map_err(|e| store_failure("create_invitation", e, ApiError::internal()))?;
    info!(invitation_id = %invitation.id, team_id = %team.id, "invitation sent");
    Ok(ok_json(json!({"success": true, "invitation": invitation})))
}

pub(crate) async fn respond_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let user = authenticate(&state, &headers).await?;
    let invitation_id = InvitationId::parse(&id).map_err(|_| invitation_not_found())?;
    let req: InviteRespondRequest = parse_body(&body)?;
    let action = require_str(&req.action, "action")?;
    let accepted = match action {
        "accept" => true,
        "reject" => false,
        other => {
            return Err(
                ApiError::validation(format!("unknown action {other:?}; expected accept or reject"))
                    .into(),
            );
        }
    };
    let mut invitation = state
        .store
        .invitation_by_id(&invitation_id)
        .await
        .map_err(|e| store_failure("invitation_by_id", e, invitation_not_found()))?;
    // Only the invited user may answer, and only once.
    if invitation.recipient != user.account.id {
        return Err(ApiError::forbidden().into());
    }
    if invitation.status != InvitationStatus::Pending {
        return Err(ApiError::conflict("invitation already answered").into());
    }
    invitation.status = if accepted {
        InvitationStatus::Accepted
    } else {
        InvitationStatus::Rejected
    };
    if accepted {
        let mut team = state
            .store
            .team_by_id(&invitation.team_id)
            .await
            .map_err(|e| store_failure("team_by_id", e, team_not_found()))?;
        if !team.is_member(&invitation.recipient) {
            team.members.push(invitation.recipient.clone());
            team.log_activity(format!("{} joined the team", user.account.display_name));
        }
        state
            .store
            .save_team(&team)
            .await
            .map_err(|e| store_failure("save_team", e, team_not_found()))?;
    }
    state
        .store
        .save_invitation(&invitation)
        .await
        .map_err(|e| store_failure("save_invitation", e, invitation_not_found()))?;
    info!(invitation_id = %invitation.id, status = %invitation.status, "invitation answered");
    Ok(ok_json(json!({"success": true, "invitation": invitation})))
}
