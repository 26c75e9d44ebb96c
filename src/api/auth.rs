/// Session endpoints: login, logout, check-session
use crate::{
    account::{CheckSessionResponse, LoginRequest, LoginResponse, MessageResponse},
    auth::AuthSession,
    context::AppContext,
    error::ConsoleResult,
    session::{SESSION_COOKIE, SESSION_TTL_HOURS},
};
use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Build the session cookie: HTTP-only, fixed 24-hour lifetime,
/// no sliding renewal
fn session_cookie(key: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_TTL_HOURS))
        .build()
}

/// Cookie that clears the session cookie on the client
fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Login endpoint
pub async fn login(
    State(ctx): State<AppContext>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> ConsoleResult<(CookieJar, Json<LoginResponse>)> {
    let (key, user) = ctx.auth.login(&req.email, &req.password).await?;

    Ok((jar.add(session_cookie(key)), Json(LoginResponse { user })))
}

/// Logout endpoint
pub async fn logout(
    State(ctx): State<AppContext>,
    session: AuthSession,
    jar: CookieJar,
) -> ConsoleResult<(CookieJar, Json<MessageResponse>)> {
    ctx.auth.logout(&session.key).await?;

    Ok((
        jar.remove(removal_cookie()),
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    ))
}

/// Check-session endpoint; never errors
pub async fn check_session(
    State(ctx): State<AppContext>,
    jar: CookieJar,
) -> Json<CheckSessionResponse> {
    let key = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string());

    Json(ctx.auth.check_session(key.as_deref()).await)
}
