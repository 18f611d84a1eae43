use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Authenticated caller state for one logged-in user.
///
/// The host application resolves an incoming request to one of these and
/// passes it to the check service; the `bypass` flag marks requests that are
/// exempt from permission checks (internal service-to-service traffic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user_id: u64,
    pub username: String,
    /// Opaque login token, attached to every outgoing service call.
    pub token: String,
    #[serde(default)]
    pub scopes: HashSet<String>,
    /// Request-scoped override: when set, every check answers true.
    #[serde(default)]
    pub bypass: bool,
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(user_id: u64, username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            token: token.into(),
            scopes: HashSet::new(),
            bypass: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bypass(mut self) -> Self {
        self.bypass = true;
        self
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

/// In-memory session store keyed by login token.
///
/// The hand-off point between the host web framework and this crate: the
/// framework inserts a session at login and looks it up per request. A miss
/// is the deny path for unauthenticated callers.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, AuthSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, session: AuthSession) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session);
    }

    pub async fn get(&self, token: &str) -> Option<AuthSession> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    pub async fn remove(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
