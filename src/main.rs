/// Newsdesk Console - account lifecycle and access control backend
///
/// Serves the admin console's authentication surface: session login,
/// invite issuance and redemption, and self-service password reset.

mod account;
mod api;
mod auth;
mod config;
mod context;
mod crypto;
mod db;
mod error;
mod invites;
mod jobs;
mod mailer;
mod server;
mod session;

use config::ServerConfig;
use context::AppContext;
use error::ConsoleResult;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ConsoleResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsdesk_console=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;
    let ctx = Arc::new(ctx);

    if !ctx.mailer.is_configured() {
        tracing::warn!("Email delivery not configured; invite and reset emails will be skipped");
    }

    // Start background jobs
    let scheduler = Arc::new(jobs::JobScheduler::new(Arc::clone(&ctx)));
    scheduler.start();

    // Start server
    server::serve((*ctx).clone()).await?;

    Ok(())
}
