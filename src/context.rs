/// Application context and dependency injection
use crate::{
    account::{AuthService, CredentialStore},
    config::ServerConfig,
    db,
    error::ConsoleResult,
    invites::InviteLedger,
    mailer::Mailer,
    session::{MemorySessionStore, SessionStore},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub auth: Arc<AuthService>,
    pub ledger: InviteLedger,
    pub sessions: Arc<dyn SessionStore>,
    pub mailer: Arc<Mailer>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ConsoleResult<Self> {
        config.validate()?;

        let db = db::create_pool(&config.storage.console_db, db::DatabaseOptions::default()).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let store = CredentialStore::new(db.clone());
        let ledger = InviteLedger::new(db.clone());
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let mailer = Arc::new(Mailer::new(config.email.clone())?);

        let auth = Arc::new(AuthService::new(
            store,
            ledger.clone(),
            Arc::clone(&sessions),
            Arc::clone(&mailer),
            config.service.public_url.clone(),
        ));

        // First run: seed the super-admin if credentials are configured
        if let Some(bootstrap) = &config.bootstrap {
            auth.ensure_bootstrap_admin(bootstrap).await?;
        }

        Ok(Self {
            config: Arc::new(config),
            db,
            auth,
            ledger,
            sessions,
            mailer,
        })
    }

    /// Public base URL for links and logs
    pub fn public_url(&self) -> &str {
        &self.config.service.public_url
    }
}
