use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::clients::{auth_headers, build_http_client, Envelope};
use crate::config::AuthConfig;
use crate::session::AuthSession;

/// Payload returned by the token service for a live login token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfo {
    pub user_id: u64,
    pub username: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Client for the remote token service.
#[derive(Debug, Clone)]
pub struct TokenClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl TokenClient {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.token_service_url.trim_end_matches('/').to_string(),
            http_client: build_http_client(config.http_timeout_secs)?,
        })
    }

    /// Resolve a raw login token into the account it belongs to.
    ///
    /// GET {base_url}/api/v1/token/verify
    /// Expects response: {"code":0,"data":{"user_id":...,"username":...,"scopes":[...]}}
    pub async fn verify(&self, token: &str) -> Result<TokenInfo> {
        let url = format!("{}/api/v1/token/verify", self.base_url);
        debug!("Verifying login token against {}", url);

        let response = self
            .http_client
            .get(&url)
            .headers(auth_headers(token)?)
            .send()
            .await
            .context("sending token verify request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "token verify failed with status {}: {}",
                status,
                body
            ));
        }

        let envelope: Envelope<TokenInfo> = response
            .json()
            .await
            .context("parsing token verify response")?;
        envelope.into_data()
    }

    /// Extend the caller's login, returning the replacement token.
    ///
    /// PUT {base_url}/api/v1/token/renew
    pub async fn renew(&self, session: &AuthSession) -> Result<String> {
        let url = format!("{}/api/v1/token/renew", self.base_url);
        debug!(user_id = %session.user_id, "Renewing login token");

        let response = self
            .http_client
            .put(&url)
            .headers(auth_headers(&session.token)?)
            .send()
            .await
            .context("sending token renew request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "token renew failed with status {}: {}",
                status,
                body
            ));
        }

        let envelope: Envelope<String> = response
            .json()
            .await
            .context("parsing token renew response")?;
        let token = envelope.into_data()?;
        info!(user_id = %session.user_id, "Login token renewed");
        Ok(token)
    }

    /// Log the caller out server-side. A 404 from the service means the
    /// token was already gone and counts as success.
    ///
    /// DELETE {base_url}/api/v1/token
    pub async fn revoke(&self, session: &AuthSession) -> Result<()> {
        let url = format!("{}/api/v1/token", self.base_url);
        debug!(user_id = %session.user_id, "Revoking login token");

        let response = self
            .http_client
            .delete(&url)
            .headers(auth_headers(&session.token)?)
            .send()
            .await
            .context("sending token revoke request")?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "token revoke failed with status {}: {}",
                status,
                body
            ));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            warn!(user_id = %session.user_id, "Token already revoked upstream");
        }

        info!(user_id = %session.user_id, "Login token revoked");
        Ok(())
    }
}
