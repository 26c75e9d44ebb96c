/// Configuration management for the Newsdesk console
use crate::error::{ConsoleError, ConsoleResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub email: Option<EmailConfig>,
    pub bootstrap: Option<BootstrapConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Public base URL embedded in invite and reset links
    pub public_url: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub console_db: PathBuf,
}

/// Email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_url: String,
    pub from_address: String,
}

/// First-run super-admin credentials. Applied only when the accounts
/// table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ConsoleResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("NEWSDESK_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("NEWSDESK_PORT")
            .unwrap_or_else(|_| "8900".to_string())
            .parse()
            .map_err(|_| ConsoleError::Validation("Invalid port number".to_string()))?;

        let public_url = env::var("NEWSDESK_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", hostname, port));

        let data_directory: PathBuf = env::var("NEWSDESK_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let console_db = env::var("NEWSDESK_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("console.sqlite"));

        let email = if let Ok(smtp_url) = env::var("NEWSDESK_EMAIL_SMTP_URL") {
            Some(EmailConfig {
                smtp_url,
                from_address: env::var("NEWSDESK_EMAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| format!("noreply@{}", hostname)),
            })
        } else {
            None
        };

        let bootstrap = match (
            env::var("NEWSDESK_ADMIN_EMAIL"),
            env::var("NEWSDESK_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapConfig {
                email,
                name: env::var("NEWSDESK_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
                password,
            }),
            _ => None,
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                public_url,
            },
            storage: StorageConfig {
                data_directory,
                console_db,
            },
            email,
            bootstrap,
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ConsoleResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ConsoleError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.service.public_url.is_empty() {
            return Err(ConsoleError::Validation(
                "Public URL cannot be empty".to_string(),
            ));
        }

        if let Some(bootstrap) = &self.bootstrap {
            if bootstrap.password.len() < 8 {
                return Err(ConsoleError::Validation(
                    "Bootstrap admin password must be at least 8 characters".to_string(),
                ));
            }
        }

        Ok(())
    }
}
