/// Tests for the console's credential-issuance building blocks
///
/// These exercise the storage-level invariants directly against the
/// embedded schema: the unique email constraint that arbitrates invite
/// redemption races, the single pending-to-accepted transition, and the
/// exclusive expiry comparisons.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn pool_with_schema() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    pool
}

fn stored_form(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[test]
fn test_stored_form_is_deterministic_and_one_way() {
    let raw = "a".repeat(64);
    let stored = stored_form(&raw);

    assert_eq!(stored, stored_form(&raw));
    assert_ne!(stored, raw);
    // SHA-256 hex digest
    assert_eq!(stored.len(), 64);
}

#[test]
fn test_raw_tokens_do_not_collide() {
    use rand::RngCore;
    use std::collections::HashSet;

    let mut seen = HashSet::new();
    for _ in 0..500 {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        assert!(seen.insert(hex::encode(bytes)));
    }
}

#[tokio::test]
async fn test_unique_email_constraint_arbitrates() {
    let pool = pool_with_schema().await;
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO accounts (id, email, name, password_hash, role, created_at)
         VALUES ('a1', 'dupe@example.com', 'First', 'hash', 'admin', ?1)",
    )
    .bind(now)
    .execute(&pool)
    .await
    .unwrap();

    // Second insert for the same email loses
    let err = sqlx::query(
        "INSERT INTO accounts (id, email, name, password_hash, role, created_at)
         VALUES ('a2', 'dupe@example.com', 'Second', 'hash', 'admin', ?1)",
    )
    .bind(now)
    .execute(&pool)
    .await
    .unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
        other => panic!("Expected a database error, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_invite_accepts_exactly_once() {
    let pool = pool_with_schema().await;
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO invites (id, email, token_hash, invited_by, status, expires_at, created_at)
         VALUES ('i1', 'new@example.com', ?1, 'a1', 'pending', ?2, ?3)",
    )
    .bind(stored_form("raw-token"))
    .bind(now + Duration::days(7))
    .bind(now)
    .execute(&pool)
    .await
    .unwrap();

    let first = sqlx::query("UPDATE invites SET status = 'accepted' WHERE id = 'i1' AND status = 'pending'")
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(first.rows_affected(), 1);

    // Guarded update is a no-op the second time: the loser of a
    // redemption race observes zero affected rows
    let second = sqlx::query("UPDATE invites SET status = 'accepted' WHERE id = 'i1' AND status = 'pending'")
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(second.rows_affected(), 0);
}

#[tokio::test]
async fn test_live_invite_lookup_expiry_is_exclusive() {
    let pool = pool_with_schema().await;
    let now = Utc::now();
    let expires_at = now + Duration::minutes(15);

    sqlx::query(
        "INSERT INTO invites (id, email, token_hash, invited_by, status, expires_at, created_at)
         VALUES ('i1', 'new@example.com', ?1, 'a1', 'pending', ?2, ?3)",
    )
    .bind(stored_form("raw-token"))
    .bind(expires_at)
    .bind(now)
    .execute(&pool)
    .await
    .unwrap();

    let live_at = |probe: DateTime<Utc>| {
        let pool = pool.clone();
        async move {
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM invites
                 WHERE token_hash = ?1 AND status = 'pending' AND expires_at > ?2",
            )
            .bind(stored_form("raw-token"))
            .bind(probe)
            .fetch_one(&pool)
            .await
            .unwrap()
        }
    };

    // One second before expiry: live. At the expiry instant: dead.
    assert_eq!(live_at(expires_at - Duration::seconds(1)).await, 1);
    assert_eq!(live_at(expires_at).await, 0);
    assert_eq!(live_at(expires_at + Duration::minutes(1)).await, 0);
}

#[tokio::test]
async fn test_sweep_deletes_expired_rows_only() {
    let pool = pool_with_schema().await;
    let now = Utc::now();

    for (id, offset_minutes, status) in [
        ("old-pending", -10i64, "pending"),
        ("old-accepted", -10, "accepted"),
        ("live", 10, "pending"),
    ] {
        sqlx::query(
            "INSERT INTO invites (id, email, token_hash, invited_by, status, expires_at, created_at)
             VALUES (?1, 'e@example.com', ?2, 'a1', ?3, ?4, ?5)",
        )
        .bind(id)
        .bind(stored_form(id))
        .bind(status)
        .bind(now + Duration::minutes(offset_minutes))
        .bind(now)
        .execute(&pool)
        .await
        .unwrap();
    }

    let swept = sqlx::query("DELETE FROM invites WHERE expires_at <= ?1")
        .bind(now)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(swept.rows_affected(), 2);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invites")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}
