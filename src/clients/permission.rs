use anyhow::{Context, Result};
use tracing::debug;

use crate::clients::{auth_headers, build_http_client, Envelope};
use crate::config::AuthConfig;
use crate::session::AuthSession;

/// Client for the remote permission service.
#[derive(Debug, Clone)]
pub struct PermissionClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl PermissionClient {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            base_url: config
                .permission_service_url
                .trim_end_matches('/')
                .to_string(),
            http_client: build_http_client(config.http_timeout_secs)?,
        })
    }

    /// Permission codes granted to the session's user.
    ///
    /// GET {base_url}/api/v1/permissions/{user_id}
    pub async fn permissions_of(&self, session: &AuthSession) -> Result<Vec<String>> {
        self.fetch_codes("permissions", session).await
    }

    /// Role codes granted to the session's user.
    ///
    /// GET {base_url}/api/v1/roles/{user_id}
    pub async fn roles_of(&self, session: &AuthSession) -> Result<Vec<String>> {
        self.fetch_codes("roles", session).await
    }

    async fn fetch_codes(&self, resource: &str, session: &AuthSession) -> Result<Vec<String>> {
        let url = format!("{}/api/v1/{}/{}", self.base_url, resource, session.user_id);
        debug!(user_id = %session.user_id, url = %url, "fetching granted codes");

        let response = self
            .http_client
            .get(&url)
            .headers(auth_headers(&session.token)?)
            .send()
            .await
            .with_context(|| format!("sending {} request", resource))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "{} fetch failed with status {}: {}",
                resource,
                status,
                body
            ));
        }

        let envelope: Envelope<Vec<String>> = response
            .json()
            .await
            .with_context(|| format!("parsing {} response", resource))?;
        envelope.into_data()
    }
}
