/// HTTP API routes
///
/// Thin translation layer: handlers deserialize the wire shapes, call the
/// auth service, and serialize its typed results back out.

mod accounts;
mod auth;

use crate::context::AppContext;
use axum::{
    routing::{get, post},
    Router,
};

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/check-session", get(auth::check_session))
        .route(
            "/accounts",
            get(accounts::list_accounts).delete(accounts::delete_accounts),
        )
        .route("/accounts/invite", post(accounts::invite))
        .route(
            "/accounts/verify-invite-token",
            post(accounts::verify_invite_token),
        )
        .route(
            "/accounts/create-from-invite",
            post(accounts::create_from_invite),
        )
        .route(
            "/accounts/forgot-password",
            post(accounts::forgot_password),
        )
        .route(
            "/accounts/verify-reset-token",
            post(accounts::verify_reset_token),
        )
        .route("/accounts/reset-password", post(accounts::reset_password))
}
