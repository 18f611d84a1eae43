use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

use crate::clients::permission::PermissionClient;
use crate::config::AuthConfig;
use crate::security::cache::{DecisionCache, DecisionKind};
use crate::session::AuthSession;

/// Boolean authorization checks against the remote permission service.
///
/// Permission and role decisions go through a short-lived cache; scope
/// decisions come straight from the session and never leave the process.
/// A bypassed session answers true everywhere without remote traffic.
#[derive(Debug, Clone)]
pub struct PermissionService {
    client: PermissionClient,
    cache: DecisionCache,
}

impl PermissionService {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            client: PermissionClient::new(config)?,
            cache: DecisionCache::new(
                Duration::from_secs(config.cache_ttl_secs),
                config.cache_capacity,
            ),
        })
    }

    pub async fn has_permission(&self, session: &AuthSession, name: &str) -> Result<bool> {
        self.check(session, DecisionKind::Permission, &[name]).await
    }

    /// True if the user holds at least one of the requested permission codes.
    pub async fn has_any_permission(
        &self,
        session: &AuthSession,
        names: &[&str],
    ) -> Result<bool> {
        self.check(session, DecisionKind::Permission, names).await
    }

    pub async fn has_role(&self, session: &AuthSession, name: &str) -> Result<bool> {
        self.check(session, DecisionKind::Role, &[name]).await
    }

    pub async fn has_any_role(&self, session: &AuthSession, names: &[&str]) -> Result<bool> {
        self.check(session, DecisionKind::Role, names).await
    }

    /// Scope checks are answered from the session's own grant set.
    pub fn has_scope(&self, session: &AuthSession, name: &str) -> bool {
        session.bypass || session.has_scope(name)
    }

    pub fn has_any_scope(&self, session: &AuthSession, names: &[&str]) -> bool {
        session.bypass || names.iter().any(|name| session.has_scope(name))
    }

    /// Drop cached decisions for one user, e.g. after a grant change.
    pub async fn invalidate_user(&self, user_id: u64) {
        self.cache.invalidate_user(user_id).await;
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    async fn check(
        &self,
        session: &AuthSession,
        kind: DecisionKind,
        names: &[&str],
    ) -> Result<bool> {
        if session.bypass {
            debug!(user_id = %session.user_id, "check bypassed for privileged request");
            return Ok(true);
        }
        if names.is_empty() {
            return Ok(false);
        }

        let key = DecisionCache::key(kind, session.user_id, names);
        if let Some(decision) = self.cache.get(&key).await {
            debug!(user_id = %session.user_id, key = %key, decision, "decision cache hit");
            return Ok(decision);
        }

        let granted = match kind {
            DecisionKind::Permission => self.client.permissions_of(session).await?,
            DecisionKind::Role => self.client.roles_of(session).await?,
        };
        let decision = names.iter().any(|name| granted.iter().any(|g| g == name));

        // A remote failure returns above without touching the cache; only
        // real decisions are stored.
        self.cache.put(key.clone(), decision).await;

        if decision {
            debug!(user_id = %session.user_id, key = %key, "check passed");
        } else {
            info!(user_id = %session.user_id, key = %key, "check denied");
        }
        Ok(decision)
    }
}
