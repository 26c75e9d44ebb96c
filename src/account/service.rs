/// Auth service: the control logic behind every account flow
///
/// Flows return typed results; the HTTP layer only translates them to the
/// wire. Existence probes (login, token verification, forgot-password)
/// answer identically whether the underlying cause is "not found",
/// "expired", or "already used", so a probing client learns nothing.
use crate::{
    account::CredentialStore,
    account::{
        AccountSummary, CheckSessionResponse, DeleteAccountsResponse, ListAccountsQuery,
        ListAccountsResponse, MessageResponse, Pagination, VerifyInviteResponse,
    },
    config::BootstrapConfig,
    db::models::{Account, Role},
    error::{ConsoleError, ConsoleResult},
    invites::InviteLedger,
    mailer::Mailer,
    session::{SessionSnapshot, SessionStore},
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use validator::ValidateEmail;

/// Reset tokens are short-lived: long enough to read an email, too short
/// to hoard
pub const RESET_TTL_MINUTES: i64 = 15;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// One message for every login failure, so unknown emails and wrong
/// passwords are indistinguishable
const LOGIN_FAILED: &str = "Invalid email or password";

/// One acknowledgement for every forgot-password request
const FORGOT_ACK: &str = "If an account exists for that email, a password reset link has been sent";

/// Orchestrates login, sessions, invites, and password resets
pub struct AuthService {
    store: CredentialStore,
    ledger: InviteLedger,
    sessions: Arc<dyn SessionStore>,
    mailer: Arc<Mailer>,
    public_url: String,
}

impl AuthService {
    pub fn new(
        store: CredentialStore,
        ledger: InviteLedger,
        sessions: Arc<dyn SessionStore>,
        mailer: Arc<Mailer>,
        public_url: String,
    ) -> Self {
        Self {
            store,
            ledger,
            sessions,
            mailer,
            public_url,
        }
    }

    /// Create the first super-admin when the accounts table is empty.
    /// Runs at startup; a populated table makes this a no-op.
    pub async fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapConfig) -> ConsoleResult<()> {
        if self.store.count(None).await? > 0 {
            return Ok(());
        }

        let account = self
            .store
            .create(
                &bootstrap.email,
                &bootstrap.name,
                &bootstrap.password,
                Role::SuperAdmin,
            )
            .await?;

        tracing::info!("Created bootstrap super-admin account: {}", account.email);
        Ok(())
    }

    /// Verify credentials and establish a session.
    /// Returns the opaque session key alongside the snapshot.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> ConsoleResult<(String, SessionSnapshot)> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ConsoleError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| ConsoleError::Unauthorized(LOGIN_FAILED.to_string()))?;

        if !crate::crypto::password::verify_password(password, &account.password_hash) {
            return Err(ConsoleError::Unauthorized(LOGIN_FAILED.to_string()));
        }

        self.store.update_last_login(&account.id).await?;

        let snapshot = snapshot_of(&account)?;
        let key = self.sessions.establish(snapshot.clone()).await;

        tracing::info!("Login: {}", snapshot.email);
        Ok((key, snapshot))
    }

    /// Destroy the session behind a key
    pub async fn logout(&self, key: &str) -> ConsoleResult<()> {
        self.sessions.destroy(key).await;
        Ok(())
    }

    /// Report session state; never errors
    pub async fn check_session(&self, key: Option<&str>) -> CheckSessionResponse {
        let user = match key {
            Some(key) => self.sessions.identity(key).await,
            None => None,
        };

        CheckSessionResponse {
            is_authenticated: user.is_some(),
            user,
        }
    }

    /// Issue an invite for an email with no existing account.
    /// The invite row is durable before dispatch is attempted; a failed
    /// send is logged and the issuer simply re-invites.
    pub async fn issue_invite(&self, issuer: &SessionSnapshot, email: &str) -> ConsoleResult<()> {
        let email = email.trim();
        if email.is_empty() || !email.validate_email() {
            return Err(ConsoleError::Validation(
                "A valid email address is required".to_string(),
            ));
        }

        if self.store.email_exists(email).await? {
            return Err(ConsoleError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let created = self.ledger.create_invite(email, &issuer.id).await?;
        tracing::info!(
            "Invite issued for {} by {}",
            created.invite.email,
            issuer.email
        );

        let mailer = Arc::clone(&self.mailer);
        let to_email = created.invite.email.clone();
        let raw_token = created.raw_token;
        let base_url = self.public_url.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer
                .send_invite_email(&to_email, &raw_token, &base_url)
                .await
            {
                tracing::warn!("Failed to send invite email to {}: {}", to_email, e);
            }
        });

        Ok(())
    }

    /// Resolve a raw invite token to the invited email
    pub async fn verify_invite(&self, raw_token: &str) -> ConsoleResult<VerifyInviteResponse> {
        let invite = self
            .ledger
            .find_live_by_token(raw_token)
            .await?
            .ok_or(ConsoleError::NotFoundOrExpired)?;

        Ok(VerifyInviteResponse {
            email: invite.email,
        })
    }

    /// Redeem an invite: create the account, then mark the invite.
    ///
    /// The unique email constraint is the race arbiter: if the email was
    /// taken between issuance and redemption (or by a concurrent
    /// redemption of the same token), creation fails and the invite is
    /// left pending. Marking the invite accepted afterwards is attempted
    /// but not required; account creation already succeeded.
    pub async fn redeem_invite(
        &self,
        raw_token: &str,
        name: &str,
        password: &str,
    ) -> ConsoleResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConsoleError::Validation("Name is required".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ConsoleError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let invite = self
            .ledger
            .find_live_by_token(raw_token)
            .await?
            .ok_or(ConsoleError::NotFoundOrExpired)?;

        let account = self
            .store
            .create(&invite.email, name, password, Role::Admin)
            .await?;

        if let Err(e) = self.ledger.mark_accepted(&invite.id).await {
            tracing::warn!(
                "Account {} created but invite {} could not be marked accepted: {}",
                account.email,
                invite.id,
                e
            );
        }

        tracing::info!("Invite redeemed: {}", account.email);
        Ok(account)
    }

    /// Begin a password reset. The acknowledgement is identical whether
    /// or not an account exists; when none does, nothing is written.
    pub async fn forgot_password(&self, email: &str) -> ConsoleResult<MessageResponse> {
        if let Some(account) = self.store.find_by_email(email).await? {
            let token = crate::crypto::issue();
            let expires_at = Utc::now() + Duration::minutes(RESET_TTL_MINUTES);

            self.store
                .set_reset_token(&account.id, &token.stored, expires_at)
                .await?;

            let mailer = Arc::clone(&self.mailer);
            let base_url = self.public_url.clone();
            tokio::spawn(async move {
                if let Err(e) = mailer
                    .send_password_reset_email(&account.email, &account.name, &token.raw, &base_url)
                    .await
                {
                    tracing::warn!("Failed to send reset email to {}: {}", account.email, e);
                }
            });
        }

        Ok(MessageResponse {
            message: FORGOT_ACK.to_string(),
        })
    }

    /// Check a raw reset token without consuming it
    pub async fn verify_reset_token(&self, raw_token: &str) -> ConsoleResult<()> {
        let stored = crate::crypto::derive(raw_token);

        self.store
            .find_by_reset_token(&stored, Utc::now())
            .await?
            .ok_or(ConsoleError::NotFoundOrExpired)?;

        Ok(())
    }

    /// Consume a reset token: replace the password and clear the token
    /// fields. Once cleared, the same token is a lookup miss.
    pub async fn reset_password(&self, raw_token: &str, new_password: &str) -> ConsoleResult<()> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(ConsoleError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let stored = crate::crypto::derive(raw_token);
        let account = self
            .store
            .find_by_reset_token(&stored, Utc::now())
            .await?
            .ok_or(ConsoleError::NotFoundOrExpired)?;

        self.store.set_password(&account.id, new_password).await?;
        self.store.clear_reset_token(&account.id).await?;

        tracing::info!("Password reset completed for {}", account.email);
        Ok(())
    }

    /// Physically remove accounts. A batch containing the acting
    /// account's own id is rejected outright; nothing is deleted.
    pub async fn delete_accounts(
        &self,
        actor: &SessionSnapshot,
        ids: &[String],
    ) -> ConsoleResult<DeleteAccountsResponse> {
        if ids.is_empty() {
            return Err(ConsoleError::Validation(
                "No account ids supplied".to_string(),
            ));
        }

        if ids.iter().any(|id| id == &actor.id) {
            return Err(ConsoleError::Validation(
                "Cannot delete your own account".to_string(),
            ));
        }

        let deleted_count = self.store.delete_many(ids).await?;
        tracing::info!("{} deleted {} account(s)", actor.email, deleted_count);

        Ok(DeleteAccountsResponse { deleted_count })
    }

    /// Paginated, searchable account listing for the console
    pub async fn list_accounts(
        &self,
        query: &ListAccountsQuery,
    ) -> ConsoleResult<ListAccountsResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let search = query.search.as_deref();

        let total = self.store.count(search).await?;
        let accounts = self
            .store
            .list(page, limit, search)
            .await?
            .into_iter()
            .map(AccountSummary::from)
            .collect();

        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Ok(ListAccountsResponse {
            accounts,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages,
            },
        })
    }
}

/// Capture the identity fields a session holds for its lifetime
fn snapshot_of(account: &Account) -> ConsoleResult<SessionSnapshot> {
    Ok(SessionSnapshot {
        id: account.id.clone(),
        name: account.name.clone(),
        email: account.email.clone(),
        role: account.role()?,
    })
}
