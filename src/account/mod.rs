/// Account flows: request/response shapes
///
/// Every flow has a typed wire shape; handlers translate these to and
/// from the service layer.

mod service;
mod store;

pub use service::AuthService;
pub use store::CredentialStore;

use crate::session::SessionSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login request. Fields default to empty so missing keys surface as the
/// service's 400, not a body-rejection from the framework.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: SessionSnapshot,
}

/// Check-session response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSessionResponse {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionSnapshot>,
}

/// Invite issuance request
#[derive(Debug, Clone, Deserialize)]
pub struct InviteRequest {
    #[serde(default)]
    pub email: String,
}

/// Token carried back from an invite or reset link
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: String,
}

/// Verify-invite-token response
#[derive(Debug, Clone, Serialize)]
pub struct VerifyInviteResponse {
    pub email: String,
}

/// Create-from-invite request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFromInviteRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

/// Forgot-password request
#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Reset-password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Generic acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Account deletion request
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAccountsRequest {
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Account deletion response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountsResponse {
    pub deleted_count: u64,
}

/// Account listing query
#[derive(Debug, Clone, Deserialize)]
pub struct ListAccountsQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Account summary for the admin listing (no credential material)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<crate::db::models::Account> for AccountSummary {
    fn from(account: crate::db::models::Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            name: account.name,
            role: account.role,
            created_at: account.created_at,
            last_login_at: account.last_login_at,
        }
    }
}

/// Pagination envelope
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Account listing response
#[derive(Debug, Clone, Serialize)]
pub struct ListAccountsResponse {
    pub accounts: Vec<AccountSummary>,
    pub pagination: Pagination,
}
