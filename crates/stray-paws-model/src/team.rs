// SPDX-License-Identifier: Apache-2.0

use crate::ids::{InvitationId, TeamId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl Display for InvitationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volunteer team. The activity log is append-only free text, newest last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub creator: UserId,
    pub members: Vec<UserId>,
    #[serde(default)]
    pub activity_log: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
}

impl Team {
    /// New team: the creator is its first member.
    #[must_use]
    pub fn created(id: TeamId, name: String, creator: UserId, created_at_ms: i64) -> Self {
        Self {
            id,
            name,
            creator: creator.clone(),
            members: vec![creator],
            activity_log: Vec::new(),
            created_at_ms,
        }
    }

    pub fn log_activity(&mut self, entry: String) {
        self.activity_log.push(entry);
    }

    #[must_use]
    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }
}

/// Three-state join request between a sender and a recipient, scoped to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Invitation {
    pub id: InvitationId,
    pub team_id: TeamId,
    pub sender: UserId,
    pub recipient: UserId,
    pub status: InvitationStatus,
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
}

impl Invitation {
    #[must_use]
    pub fn sent(
        id: InvitationId,
        team_id: TeamId,
        sender: UserId,
        recipient: UserId,
        created_at_ms: i64,
    ) -> Self {
        Self {
            id,
            team_id,
            sender,
            recipient,
            status: InvitationStatus::Pending,
            created_at_ms,
        }
    }
}
