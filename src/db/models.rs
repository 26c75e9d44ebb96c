/// Database models for accounts and invites
use crate::error::{ConsoleError, ConsoleResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Console role levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Day-to-day content administration
    Admin,
    /// Full access, can manage accounts and invites
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }

    pub fn from_str(s: &str) -> ConsoleResult<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(ConsoleError::Validation(format!("Invalid role: {}", s))),
        }
    }

    /// Check if this role can perform actions requiring another role
    pub fn can_act_as(&self, required: Role) -> bool {
        self >= &required
    }
}

/// Account record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn role(&self) -> ConsoleResult<Role> {
        Role::from_str(&self.role)
    }
}

/// Invite lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    /// Pending row whose expiry has elapsed but which the sweep has not
    /// yet removed. Computed on read, never stored.
    Expired,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Expired => "expired",
        }
    }
}

/// Invite record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Invite {
    pub id: String,
    pub email: String,
    pub token_hash: String,
    pub invited_by: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Status as of `now`, folding elapsed expiry into `Expired`
    pub fn status_at(&self, now: DateTime<Utc>) -> InviteStatus {
        match self.status.as_str() {
            "accepted" => InviteStatus::Accepted,
            _ if now >= self.expires_at => InviteStatus::Expired,
            _ => InviteStatus::Pending,
        }
    }
}

/// Normalize an email for storage and lookup: trimmed, lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_role_ordering() {
        assert!(Role::SuperAdmin.can_act_as(Role::Admin));
        assert!(Role::SuperAdmin.can_act_as(Role::SuperAdmin));
        assert!(!Role::Admin.can_act_as(Role::SuperAdmin));
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str("superadmin").unwrap(), Role::SuperAdmin);
        assert_eq!(Role::from_str("Admin").unwrap(), Role::Admin);
        assert!(Role::from_str("moderator").is_err());
    }

    #[test]
    fn test_invite_status_folds_expiry() {
        let now = Utc::now();
        let invite = Invite {
            id: "i1".to_string(),
            email: "a@example.com".to_string(),
            token_hash: "h".to_string(),
            invited_by: "u1".to_string(),
            status: "pending".to_string(),
            expires_at: now,
            created_at: now - Duration::days(7),
        };

        // Expiry instant is exclusive: at expires_at the invite is expired
        assert_eq!(invite.status_at(now), InviteStatus::Expired);
        assert_eq!(
            invite.status_at(now - Duration::seconds(1)),
            InviteStatus::Pending
        );
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Editor@Example.COM "), "editor@example.com");
    }
}
