use moka::future::Cache;
use std::time::Duration;

/// Which grant list a cached decision was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    Permission,
    Role,
}

impl DecisionKind {
    fn as_str(self) -> &'static str {
        match self {
            DecisionKind::Permission => "perm",
            DecisionKind::Role => "role",
        }
    }
}

/// TTL cache for boolean authorization decisions.
///
/// Keys combine the decision kind, the user id and the sorted requested
/// names, so the same question asked in any order lands on one entry.
/// Denials are cached exactly like grants.
#[derive(Debug, Clone)]
pub struct DecisionCache {
    inner: Cache<String, bool>,
}

impl DecisionCache {
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let inner = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(capacity)
            .build();
        Self { inner }
    }

    /// Cache key: `kind:user_id:sorted,names`. Requested names are sorted
    /// and deduped; permission codes may themselves contain colons, so
    /// consumers parse the key positionally.
    pub fn key(kind: DecisionKind, user_id: u64, names: &[&str]) -> String {
        let mut sorted: Vec<&str> = names.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        format!("{}:{}:{}", kind.as_str(), user_id, sorted.join(","))
    }

    pub async fn get(&self, key: &str) -> Option<bool> {
        self.inner.get(key).await
    }

    pub async fn put(&self, key: String, decision: bool) {
        self.inner.insert(key, decision).await;
    }

    /// Drop every cached decision for one user, e.g. after a grant change.
    pub async fn invalidate_user(&self, user_id: u64) {
        let uid = user_id.to_string();
        let stale: Vec<String> = self
            .inner
            .iter()
            .filter(|(key, _)| {
                let mut parts = key.splitn(3, ':');
                parts.next();
                parts.next() == Some(uid.as_str())
            })
            .map(|(key, _)| (*key).clone())
            .collect();
        for key in stale {
            self.inner.invalidate(&key).await;
        }
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
