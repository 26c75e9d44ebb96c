/// Invite ledger
///
/// Persisted invite records with a two-transition state machine:
/// `pending` becomes `accepted` on redemption, or is physically removed
/// once its expiry passes. Tokens are stored only as one-way hashes; a
/// lookup for an expired, redeemed, or unknown token is the same miss.
use crate::{
    crypto,
    db::models::{normalize_email, Invite, InviteStatus},
    error::{ConsoleError, ConsoleResult},
};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Invite validity window
pub const INVITE_TTL_DAYS: i64 = 7;

/// Invite records and their state machine
#[derive(Clone)]
pub struct InviteLedger {
    db: SqlitePool,
}

/// A freshly created invite plus the raw token to embed in the link
#[derive(Debug, Clone)]
pub struct CreatedInvite {
    pub invite: Invite,
    pub raw_token: String,
}

impl InviteLedger {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a pending invite for an email, valid for 7 days.
    ///
    /// Stale rows for the same email (pending AND already past expiry) are
    /// purged first, so a ledger that missed a sweep heals itself here. A
    /// live pending invite for the same email is left alone: verification
    /// is keyed by token, so concurrent invites coexist harmlessly.
    pub async fn create_invite(&self, email: &str, issuer_id: &str) -> ConsoleResult<CreatedInvite> {
        let email = normalize_email(email);
        let now = Utc::now();

        sqlx::query(
            "DELETE FROM invites WHERE email = ?1 AND status = 'pending' AND expires_at <= ?2",
        )
        .bind(&email)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        let token = crypto::issue();
        let id = Uuid::new_v4().to_string();
        let expires_at = now + Duration::days(INVITE_TTL_DAYS);

        sqlx::query(
            "INSERT INTO invites (id, email, token_hash, invited_by, status, expires_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&id)
        .bind(&email)
        .bind(&token.stored)
        .bind(issuer_id)
        .bind(InviteStatus::Pending.as_str())
        .bind(expires_at)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(CreatedInvite {
            invite: Invite {
                id,
                email,
                token_hash: token.stored,
                invited_by: issuer_id.to_string(),
                status: InviteStatus::Pending.as_str().to_string(),
                expires_at,
                created_at: now,
            },
            raw_token: token.raw,
        })
    }

    /// Find the live pending invite matching a raw token.
    ///
    /// Expired and redeemed tokens are indistinguishable from unknown
    /// ones: all three are `None`.
    pub async fn find_live_by_token(&self, raw_token: &str) -> ConsoleResult<Option<Invite>> {
        let token_hash = crypto::derive(raw_token);

        let invite = sqlx::query_as::<_, Invite>(
            "SELECT * FROM invites
             WHERE token_hash = ?1 AND status = 'pending' AND expires_at > ?2",
        )
        .bind(&token_hash)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(invite)
    }

    /// Transition a pending invite to accepted.
    ///
    /// Marking a row that is no longer pending is a caller error, not a
    /// silent no-op: redemption must notice when it lost the race.
    pub async fn mark_accepted(&self, invite_id: &str) -> ConsoleResult<()> {
        let result = sqlx::query(
            "UPDATE invites SET status = ?1 WHERE id = ?2 AND status = ?3",
        )
        .bind(InviteStatus::Accepted.as_str())
        .bind(invite_id)
        .bind(InviteStatus::Pending.as_str())
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ConsoleError::Conflict(
                "Invite is not pending".to_string(),
            ));
        }

        Ok(())
    }

    /// Remove every row past its expiry regardless of status, so the
    /// ledger never grows unbounded. Wired to a periodic job.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> ConsoleResult<u64> {
        let result = sqlx::query("DELETE FROM invites WHERE expires_at <= ?1")
            .bind(now)
            .execute(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }

    #[cfg(test)]
    async fn force_expiry(&self, invite_id: &str, expires_at: DateTime<Utc>) {
        sqlx::query("UPDATE invites SET expires_at = ?1 WHERE id = ?2")
            .bind(expires_at)
            .bind(invite_id)
            .execute(&self.db)
            .await
            .unwrap();
    }

    #[cfg(test)]
    async fn count_for_email(&self, email: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM invites WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await
            .unwrap()
    }
}
