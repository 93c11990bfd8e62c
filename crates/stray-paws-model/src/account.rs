// SPDX-License-Identifier: Apache-2.0

use crate::ids::UserId;
use crate::order::Points;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Role {
    Donor,
    Volunteer,
    Admin,
}

impl Role {
    pub fn parse(input: &str) -> Result<Self, crate::ParseError> {
        match input {
            "donor" => Ok(Self::Donor),
            "volunteer" => Ok(Self::Volunteer),
            "admin" => Ok(Self::Admin),
            _ => Err(crate::ParseError::InvalidFormat(
                "role must be one of donor, volunteer, admin",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Volunteer => "volunteer",
            Self::Admin => "admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user ledger account. The point balance is the authoritative PetPoints ledger;
/// it is debited by order placement and credited by point loading, never anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct UserAccount {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub credential_sha256: String,
    pub role: Role,
    pub balance: Points,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
    #[serde(rename = "createdAt")]
    pub created_at_ms: i64,
}

impl UserAccount {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: UserId,
        display_name: String,
        email: String,
        credential_sha256: String,
        role: Role,
        balance: Points,
        location: String,
        bio: String,
        created_at_ms: i64,
    ) -> Self {
        Self {
            id,
            display_name,
            email,
            credential_sha256,
            role,
            balance,
            location,
            bio,
            created_at_ms,
        }
    }

    /// Freshly registered account: balance starts at zero.
    #[must_use]
    pub fn registered(
        id: UserId,
        display_name: String,
        email: String,
        credential_sha256: String,
        role: Role,
        created_at_ms: i64,
    ) -> Self {
        Self::new(
            id,
            display_name,
            email,
            credential_sha256,
            role,
            0,
            String::new(),
            String::new(),
            created_at_ms,
        )
    }

    #[must_use]
    pub fn can_afford(&self, cost: Points) -> bool {
        self.balance >= cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_round_trips() {
        for role in [Role::Donor, Role::Volunteer, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Ok(role));
        }
        assert!(Role::parse("superuser").is_err());
    }

    #[test]
    fn registered_account_starts_at_zero() {
        let account = UserAccount::registered(
            UserId::parse("usr-1").expect("id"),
            "Sam".to_string(),
            "sam@example.org".to_string(),
            "deadbeef".to_string(),
            Role::Donor,
            1_700_000_000_000,
        );
        assert_eq!(account.balance, 0);
        assert!(account.can_afford(0));
        assert!(!account.can_afford(1));
    }
}
