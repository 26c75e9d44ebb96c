/// Authentication extractors
///
/// Handlers take `AuthSession` or `SuperAdminSession` as arguments; the
/// extractor resolves the session cookie against the injected store and
/// rejects before the handler body runs.
use crate::{
    context::AppContext,
    db::models::Role,
    error::ConsoleError,
    session::{SessionSnapshot, SESSION_COOKIE},
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

/// Authenticated session: any role
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Opaque session key from the cookie
    pub key: String,
    /// Identity captured at login
    pub snapshot: SessionSnapshot,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthSession {
    type Rejection = ConsoleError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ConsoleError::Unauthorized("Authentication required".to_string()))?;

        let key = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| ConsoleError::Unauthorized("Authentication required".to_string()))?;

        let snapshot = state
            .sessions
            .identity(&key)
            .await
            .ok_or_else(|| ConsoleError::Unauthorized("Authentication required".to_string()))?;

        Ok(AuthSession { key, snapshot })
    }
}

/// Authenticated session holding the super-admin role
#[derive(Debug, Clone)]
pub struct SuperAdminSession {
    pub key: String,
    pub snapshot: SessionSnapshot,
}

#[async_trait]
impl FromRequestParts<AppContext> for SuperAdminSession {
    type Rejection = ConsoleError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;

        if !session.snapshot.role.can_act_as(Role::SuperAdmin) {
            tracing::warn!(
                "Forbidden: {} attempted a super-admin action",
                session.snapshot.email
            );
            return Err(ConsoleError::Forbidden(
                "Super-admin role required".to_string(),
            ));
        }

        Ok(SuperAdminSession {
            key: session.key,
            snapshot: session.snapshot,
        })
    }
}
