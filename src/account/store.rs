/// Credential store over the accounts table
///
/// The only write path for account records. Passwords and reset tokens
/// cross this boundary in raw form exactly once and are persisted only as
/// one-way derivations.
use crate::{
    crypto::password,
    db::models::{normalize_email, Account, Role},
    error::{ConsoleError, ConsoleResult},
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Persisted account records
#[derive(Clone)]
pub struct CredentialStore {
    db: SqlitePool,
}

impl CredentialStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an account, hashing the password before persisting.
    /// A taken email fails with `Conflict`; the unique index on email is
    /// what makes this safe under concurrent redemption.
    pub async fn create(
        &self,
        email: &str,
        name: &str,
        raw_password: &str,
        role: Role,
    ) -> ConsoleResult<Account> {
        let email = normalize_email(email);
        let password_hash = password::hash_password(raw_password)?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO accounts (id, email, name, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&id)
        .bind(&email)
        .bind(name)
        .bind(&password_hash)
        .bind(role.as_str())
        .bind(now)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            let err = ConsoleError::Database(e);
            if err.is_unique_violation() {
                return Err(ConsoleError::Conflict(
                    "An account with this email already exists".to_string(),
                ));
            }
            return Err(err);
        }

        Ok(Account {
            id,
            email,
            name: name.to_string(),
            password_hash,
            role: role.as_str().to_string(),
            created_at: now,
            last_login_at: None,
            reset_token_hash: None,
            reset_token_expires_at: None,
        })
    }

    /// Find an account by email
    pub async fn find_by_email(&self, email: &str) -> ConsoleResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?1")
            .bind(normalize_email(email))
            .fetch_optional(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(account)
    }

    /// Find an account by id
    pub async fn find_by_id(&self, id: &str) -> ConsoleResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(account)
    }

    /// Check whether an email is taken
    pub async fn email_exists(&self, email: &str) -> ConsoleResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = ?1")
            .bind(normalize_email(email))
            .fetch_one(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(count > 0)
    }

    /// Stamp a successful login
    pub async fn update_last_login(&self, id: &str) -> ConsoleResult<()> {
        sqlx::query("UPDATE accounts SET last_login_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(())
    }

    /// Attach an outstanding reset token (stored form + absolute expiry).
    /// Overwrites any previous token, keeping at most one outstanding.
    pub async fn set_reset_token(
        &self,
        id: &str,
        stored_token: &str,
        expires_at: DateTime<Utc>,
    ) -> ConsoleResult<()> {
        sqlx::query(
            "UPDATE accounts SET reset_token_hash = ?1, reset_token_expires_at = ?2 WHERE id = ?3",
        )
        .bind(stored_token)
        .bind(expires_at)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(())
    }

    /// Clear the outstanding reset token
    pub async fn clear_reset_token(&self, id: &str) -> ConsoleResult<()> {
        sqlx::query(
            "UPDATE accounts SET reset_token_hash = NULL, reset_token_expires_at = NULL WHERE id = ?1",
        )
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(())
    }

    /// Find the account holding an unexpired reset token.
    /// Expiry is exclusive: a token is live only while now < expires_at.
    pub async fn find_by_reset_token(
        &self,
        stored_token: &str,
        now: DateTime<Utc>,
    ) -> ConsoleResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT * FROM accounts WHERE reset_token_hash = ?1 AND reset_token_expires_at > ?2",
        )
        .bind(stored_token)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .map_err(ConsoleError::Database)?;

        Ok(account)
    }

    /// Replace the password, re-hashing the raw form
    pub async fn set_password(&self, id: &str, raw_password: &str) -> ConsoleResult<()> {
        let password_hash = password::hash_password(raw_password)?;

        sqlx::query("UPDATE accounts SET password_hash = ?1 WHERE id = ?2")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(())
    }

    /// Physically remove the listed accounts, returning how many went.
    /// Excluding the acting account's own id is the caller's policy, not
    /// enforced here.
    pub async fn delete_many(&self, ids: &[String]) -> ConsoleResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!("DELETE FROM accounts WHERE id IN ({})", placeholders);

        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let result = query
            .execute(&self.db)
            .await
            .map_err(ConsoleError::Database)?;

        Ok(result.rows_affected())
    }

    /// Paginated listing with an optional email/name substring filter
    pub async fn list(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
    ) -> ConsoleResult<Vec<Account>> {
        let offset = (page - 1) * limit;

        let accounts = match search {
            Some(term) if !term.trim().is_empty() => {
                let pattern = format!("%{}%", term.trim().to_lowercase());
                sqlx::query_as::<_, Account>(
                    "SELECT * FROM accounts
                     WHERE email LIKE ?1 OR lower(name) LIKE ?1
                     ORDER BY created_at DESC LIMIT ?2 OFFSET ?3",
                )
                .bind(pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.db)
                .await
            }
            _ => {
                sqlx::query_as::<_, Account>(
                    "SELECT * FROM accounts ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.db)
                .await
            }
        }
        .map_err(ConsoleError::Database)?;

        Ok(accounts)
    }

    /// Count accounts matching the listing filter
    pub async fn count(&self, search: Option<&str>) -> ConsoleResult<i64> {
        let count: i64 = match search {
            Some(term) if !term.trim().is_empty() => {
                let pattern = format!("%{}%", term.trim().to_lowercase());
                sqlx::query_scalar(
                    "SELECT COUNT(*) FROM accounts WHERE email LIKE ?1 OR lower(name) LIKE ?1",
                )
                .bind(pattern)
                .fetch_one(&self.db)
                .await
            }
            _ => {
                sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
                    .fetch_one(&self.db)
                    .await
            }
        }
        .map_err(ConsoleError::Database)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto;
    use chrono::Duration;

    async fn store() -> CredentialStore {
        CredentialStore::new(crate::db::test_pool().await)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = store().await;
        let account = store
            .create("Editor@Example.com", "Desk Editor", "press-room-8", Role::Admin)
            .await
            .unwrap();

        // Email is normalized on the way in
        assert_eq!(account.email, "editor@example.com");
        assert_ne!(account.password_hash, "press-room-8");

        let found = store.find_by_email("EDITOR@example.COM").await.unwrap().unwrap();
        assert_eq!(found.id, account.id);
        assert!(found.last_login_at.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = store().await;
        store
            .create("dupe@example.com", "First", "password-one", Role::Admin)
            .await
            .unwrap();

        let err = store
            .create("DUPE@example.com", "Second", "password-two", Role::Admin)
            .await
            .unwrap_err();

        assert!(matches!(err, ConsoleError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_last_login() {
        let store = store().await;
        let account = store
            .create("login@example.com", "Login", "press-room-8", Role::Admin)
            .await
            .unwrap();

        store.update_last_login(&account.id).await.unwrap();

        let found = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(found.last_login_at.is_some());
        assert!(found.last_login_at.unwrap() >= account.created_at);
    }

    #[tokio::test]
    async fn test_reset_token_lifecycle() {
        let store = store().await;
        let account = store
            .create("reset@example.com", "Reset", "press-room-8", Role::Admin)
            .await
            .unwrap();

        let token = crypto::issue();
        let expires_at = Utc::now() + Duration::minutes(15);
        store
            .set_reset_token(&account.id, &token.stored, expires_at)
            .await
            .unwrap();

        let found = store
            .find_by_reset_token(&token.stored, Utc::now())
            .await
            .unwrap();
        assert!(found.is_some());

        // Exclusive expiry: at the expiry instant the token is dead
        let at_expiry = store
            .find_by_reset_token(&token.stored, expires_at)
            .await
            .unwrap();
        assert!(at_expiry.is_none());

        store.clear_reset_token(&account.id).await.unwrap();
        let cleared = store
            .find_by_reset_token(&token.stored, Utc::now())
            .await
            .unwrap();
        assert!(cleared.is_none());
    }

    #[tokio::test]
    async fn test_set_password_rehashes() {
        let store = store().await;
        let account = store
            .create("pw@example.com", "Pw", "original-pass-1", Role::Admin)
            .await
            .unwrap();

        store.set_password(&account.id, "replaced-pass-2").await.unwrap();

        let found = store.find_by_id(&account.id).await.unwrap().unwrap();
        assert_ne!(found.password_hash, account.password_hash);
        assert!(crypto::password::verify_password(
            "replaced-pass-2",
            &found.password_hash
        ));
        assert!(!crypto::password::verify_password(
            "original-pass-1",
            &found.password_hash
        ));
    }

    #[tokio::test]
    async fn test_delete_many() {
        let store = store().await;
        let a = store
            .create("a@example.com", "A", "password-aa", Role::Admin)
            .await
            .unwrap();
        let b = store
            .create("b@example.com", "B", "password-bb", Role::Admin)
            .await
            .unwrap();

        let deleted = store
            .delete_many(&[a.id.clone(), b.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        assert!(store.find_by_id(&a.id).await.unwrap().is_none());
        assert_eq!(store.delete_many(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_and_count_with_search() {
        let store = store().await;
        store
            .create("alice@newsdesk.io", "Alice Wren", "password-aa", Role::SuperAdmin)
            .await
            .unwrap();
        store
            .create("bob@newsdesk.io", "Bob Crane", "password-bb", Role::Admin)
            .await
            .unwrap();
        store
            .create("carol@elsewhere.io", "Carol Finch", "password-cc", Role::Admin)
            .await
            .unwrap();

        assert_eq!(store.count(None).await.unwrap(), 3);
        assert_eq!(store.count(Some("newsdesk")).await.unwrap(), 2);
        assert_eq!(store.count(Some("crane")).await.unwrap(), 1);

        let page = store.list(1, 2, None).await.unwrap();
        assert_eq!(page.len(), 2);
        let rest = store.list(2, 2, None).await.unwrap();
        assert_eq!(rest.len(), 1);

        let filtered = store.list(1, 10, Some("Finch")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].email, "carol@elsewhere.io");
    }
}
