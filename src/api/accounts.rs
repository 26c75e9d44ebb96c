/// Account management endpoints: listing, invites, deletion, and the
/// password reset flow
use crate::{
    account::{
        AccountSummary, CreateFromInviteRequest, DeleteAccountsRequest, DeleteAccountsResponse,
        ForgotPasswordRequest, InviteRequest, ListAccountsQuery, ListAccountsResponse,
        MessageResponse, ResetPasswordRequest, TokenRequest, VerifyInviteResponse,
    },
    auth::SuperAdminSession,
    context::AppContext,
    error::ConsoleResult,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

/// List accounts with pagination and search (super-admin only)
pub async fn list_accounts(
    State(ctx): State<AppContext>,
    _session: SuperAdminSession,
    Query(query): Query<ListAccountsQuery>,
) -> ConsoleResult<Json<ListAccountsResponse>> {
    let listing = ctx.auth.list_accounts(&query).await?;

    Ok(Json(listing))
}

/// Issue an invitation (super-admin only)
pub async fn invite(
    State(ctx): State<AppContext>,
    session: SuperAdminSession,
    Json(req): Json<InviteRequest>,
) -> ConsoleResult<Json<MessageResponse>> {
    ctx.auth.issue_invite(&session.snapshot, &req.email).await?;

    Ok(Json(MessageResponse {
        message: "Invitation sent".to_string(),
    }))
}

/// Resolve an invite token to the invited email (public)
pub async fn verify_invite_token(
    State(ctx): State<AppContext>,
    Json(req): Json<TokenRequest>,
) -> ConsoleResult<Json<VerifyInviteResponse>> {
    let verified = ctx.auth.verify_invite(&req.token).await?;

    Ok(Json(verified))
}

/// Redeem an invite into a new admin account (public)
pub async fn create_from_invite(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateFromInviteRequest>,
) -> ConsoleResult<(StatusCode, Json<AccountSummary>)> {
    let account = ctx
        .auth
        .redeem_invite(&req.token, &req.name, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(AccountSummary::from(account))))
}

/// Delete accounts by id (super-admin only)
pub async fn delete_accounts(
    State(ctx): State<AppContext>,
    session: SuperAdminSession,
    Json(req): Json<DeleteAccountsRequest>,
) -> ConsoleResult<Json<DeleteAccountsResponse>> {
    let result = ctx
        .auth
        .delete_accounts(&session.snapshot, &req.ids)
        .await?;

    Ok(Json(result))
}

/// Begin a password reset (public; acknowledgement never varies)
pub async fn forgot_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ConsoleResult<Json<MessageResponse>> {
    let ack = ctx.auth.forgot_password(&req.email).await?;

    Ok(Json(ack))
}

/// Check a reset token without consuming it (public)
pub async fn verify_reset_token(
    State(ctx): State<AppContext>,
    Json(req): Json<TokenRequest>,
) -> ConsoleResult<Json<MessageResponse>> {
    ctx.auth.verify_reset_token(&req.token).await?;

    Ok(Json(MessageResponse {
        message: "Token is valid".to_string(),
    }))
}

/// Complete a password reset (public)
pub async fn reset_password(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetPasswordRequest>,
) -> ConsoleResult<Json<MessageResponse>> {
    ctx.auth.reset_password(&req.token, &req.new_password).await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset".to_string(),
    }))
}
