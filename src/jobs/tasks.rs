/// Background task implementations
use crate::{context::AppContext, error::ConsoleResult};
use chrono::Utc;

/// Remove invite rows past their expiry, regardless of status
pub async fn sweep_expired_invites(ctx: &AppContext) -> ConsoleResult<u64> {
    ctx.ledger.sweep_expired(Utc::now()).await
}

/// Drop sessions past their absolute lifetime
pub async fn cleanup_expired_sessions(ctx: &AppContext) -> ConsoleResult<u64> {
    Ok(ctx.sessions.purge_expired().await)
}
