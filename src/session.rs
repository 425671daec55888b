//! In-memory session registry for the web interface.
//!
//! Maps opaque session tokens to the identity that logged in. Sessions are
//! ephemeral: they live only in this process and are lost on restart. The
//! token in the `sid` cookie is the sole credential.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use tokio::sync::RwLock;

/// How long a session (and its cookie) stays valid, in seconds.
pub const SESSION_TTL_SECS: i64 = 86_400;

/// Server-side record behind a session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: String,
    pub created_at: DateTime<Utc>,
}

/// Concurrent token → [`Session`] map.
///
/// Cloning the registry clones a handle to the same map, so it can be held
/// in router state and by the eviction sweep at once. Tokens are 32 bytes
/// from the OS CSPRNG, hex-encoded; collisions are not checked, as 256
/// bits of entropy makes a duplicate practically impossible.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a session for an authenticated identity and return its token.
    pub async fn create(&self, identity: &str) -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            token.clone(),
            Session {
                identity: identity.to_string(),
                created_at: Utc::now(),
            },
        );
        token
    }

    /// Look up a session by token. `None` if never issued or destroyed.
    pub async fn lookup(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Destroy a session. Destroying an absent token is a no-op.
    pub async fn destroy(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// Drop sessions older than `max_age`; returns how many were evicted.
    ///
    /// The serve loop runs this periodically with [`SESSION_TTL_SECS`] so
    /// the registry tracks the cookie lifetime instead of growing without
    /// bound under repeated logins.
    pub async fn evict_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at > cutoff);
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_lookup_returns_identity() {
        let registry = SessionRegistry::new();
        let token = registry.create("admin").await;

        let session = registry.lookup(&token).await.expect("session missing");
        assert_eq!(session.identity, "admin");
    }

    #[tokio::test]
    async fn tokens_are_unique_and_opaque() {
        let registry = SessionRegistry::new();
        let a = registry.create("admin").await;
        let b = registry.create("admin").await;

        assert_ne!(a, b);
        assert_eq!(a.len(), 64); // 32 bytes hex-encoded
        assert_eq!(registry.count().await, 2);
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let registry = SessionRegistry::new();
        let token = registry.create("admin").await;

        registry.destroy(&token).await;
        assert!(registry.lookup(&token).await.is_none());

        // Destroying again (or a token never issued) is a no-op
        registry.destroy(&token).await;
        registry.destroy("no-such-token").await;
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn lookup_of_unknown_token_is_none() {
        let registry = SessionRegistry::new();
        assert!(registry.lookup("deadbeef").await.is_none());
    }

    #[tokio::test]
    async fn eviction_only_drops_expired_sessions() {
        let registry = SessionRegistry::new();
        let token = registry.create("admin").await;

        // Nothing is older than an hour yet
        assert_eq!(registry.evict_older_than(Duration::hours(1)).await, 0);
        assert!(registry.lookup(&token).await.is_some());

        // Everything is older than "zero seconds ago"
        assert_eq!(registry.evict_older_than(Duration::seconds(-1)).await, 1);
        assert!(registry.lookup(&token).await.is_none());
    }
}
