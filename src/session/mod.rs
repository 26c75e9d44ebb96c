/// Server-side session management
///
/// Sessions are held behind the `SessionStore` trait so request handling
/// can be tested against a store it owns rather than ambient global state.
/// Keys are opaque random identifiers carried by an HTTP-only cookie; the
/// lifetime is a fixed 24 hours from establishment, with no sliding
/// renewal.
use crate::db::models::Role;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Fixed absolute session lifetime
pub const SESSION_TTL_HOURS: i64 = 24;

/// Cookie carrying the session key
pub const SESSION_COOKIE: &str = "newsdesk_session";

/// Identity captured at login and held for the session's lifetime.
/// Not revalidated against the store per request; a deleted account's
/// session stays usable until it expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Server-side session store keyed by opaque identifiers
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Establish a session for a snapshot, returning the opaque key
    async fn establish(&self, snapshot: SessionSnapshot) -> String;

    /// Look up an unexpired session by key
    async fn identity(&self, key: &str) -> Option<SessionSnapshot>;

    /// Destroy a session; destroying an unknown key is a no-op
    async fn destroy(&self, key: &str);

    /// Remove expired sessions, returning how many were dropped
    async fn purge_expired(&self) -> u64;
}

struct SessionEntry {
    snapshot: SessionSnapshot,
    expires_at: DateTime<Utc>,
}

/// In-memory session store. Single-process by design; there is one store,
/// not distributed replication.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate_key() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn establish(&self, snapshot: SessionSnapshot) -> String {
        let key = Self::generate_key();
        let entry = SessionEntry {
            snapshot,
            expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
        };

        self.sessions.write().await.insert(key.clone(), entry);
        key
    }

    async fn identity(&self, key: &str) -> Option<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(key)?;

        if Utc::now() >= entry.expires_at {
            return None;
        }

        Some(entry.snapshot.clone())
    }

    async fn destroy(&self, key: &str) {
        self.sessions.write().await.remove(key);
    }

    async fn purge_expired(&self) -> u64 {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now < entry.expires_at);

        (before - sessions.len()) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            id: "acc-1".to_string(),
            name: "Desk Editor".to_string(),
            email: "editor@example.com".to_string(),
            role: Role::Admin,
        }
    }

    #[tokio::test]
    async fn test_establish_and_identity() {
        let store = MemorySessionStore::new();
        let key = store.establish(snapshot()).await;

        let found = store.identity(&key).await.unwrap();
        assert_eq!(found.email, "editor@example.com");
        assert_eq!(found.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_keys_are_opaque_and_unique() {
        let store = MemorySessionStore::new();
        let k1 = store.establish(snapshot()).await;
        let k2 = store.establish(snapshot()).await;

        assert_ne!(k1, k2);
        assert_eq!(k1.len(), 64);
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = MemorySessionStore::new();
        let key = store.establish(snapshot()).await;

        store.destroy(&key).await;
        assert!(store.identity(&key).await.is_none());

        // Destroying again is a no-op
        store.destroy(&key).await;
    }

    #[tokio::test]
    async fn test_unknown_key_is_none() {
        let store = MemorySessionStore::new();
        assert!(store.identity("no-such-key").await.is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemorySessionStore::new();
        let key = store.establish(snapshot()).await;

        // Force the entry past its expiry
        store
            .sessions
            .write()
            .await
            .get_mut(&key)
            .unwrap()
            .expires_at = Utc::now() - Duration::seconds(1);

        assert!(store.identity(&key).await.is_none());
        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.purge_expired().await, 0);
    }
}
