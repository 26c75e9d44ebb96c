use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{error, info};

pub mod tasks;

/// Job scheduler for background tasks
pub struct JobScheduler {
    context: Arc<crate::context::AppContext>,
}

impl JobScheduler {
    pub fn new(context: Arc<crate::context::AppContext>) -> Self {
        Self { context }
    }

    /// Start all background jobs
    pub fn start(self: Arc<Self>) {
        info!("Starting background job scheduler");

        tokio::spawn(Self::expired_invite_sweep_job(Arc::clone(&self)));
        tokio::spawn(Self::expired_session_cleanup_job(Arc::clone(&self)));

        info!("Background jobs started");
    }

    /// Sweep expired invites (runs hourly). SQLite has no native TTL, so
    /// this sweep is what keeps the ledger bounded; an expired invite is
    /// already unredeemable before the sweep reaches it.
    async fn expired_invite_sweep_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;

            match tasks::sweep_expired_invites(&scheduler.context).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Swept {} expired invite(s)", count);
                    }
                }
                Err(e) => error!("Failed to sweep expired invites: {}", e),
            }
        }
    }

    /// Cleanup expired sessions (runs hourly)
    async fn expired_session_cleanup_job(scheduler: Arc<Self>) {
        let mut interval = interval(Duration::from_secs(3600));

        loop {
            interval.tick().await;

            match tasks::cleanup_expired_sessions(&scheduler.context).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired session(s)", count);
                    }
                }
                Err(e) => error!("Failed to cleanup expired sessions: {}", e),
            }
        }
    }
}
