pub mod permission;
pub mod token;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;
use uuid::Uuid;

/// Response envelope shared by the token and permission services.
///
/// Both services answer `{"code": 0, "msg": ..., "data": ...}`; any
/// non-zero code is a service-level failure.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload of a success envelope, surfacing service errors.
    pub fn into_data(self) -> Result<T> {
        if self.code != 0 {
            anyhow::bail!(
                "service error {}: {}",
                self.code,
                self.msg.unwrap_or_default()
            );
        }
        self.data.context("data missing from success envelope")
    }
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("creating HTTP client")
}

/// Headers attached to every outgoing service call: the caller's login
/// token as bearer auth plus a correlation id.
pub(crate) fn auth_headers(token: &str) -> Result<HeaderMap> {
    let request_id = Uuid::new_v4().to_string();

    let mut headers = HeaderMap::new();
    let bearer = format!("Bearer {}", token);
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer)?);
    headers.insert("X-Request-Id", HeaderValue::from_str(&request_id)?);

    trace!(request_id = %request_id, "attaching login token to outgoing request");
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let envelope: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"code":0,"data":["a","b"]}"#).unwrap();
        assert_eq!(envelope.into_data().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_envelope_service_error() {
        let envelope: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"code":401,"msg":"token expired"}"#).unwrap();
        let err = envelope.into_data().unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("token expired"));
    }

    #[test]
    fn test_envelope_success_without_data() {
        let envelope: Envelope<String> = serde_json::from_str(r#"{"code":0}"#).unwrap();
        assert!(envelope.into_data().is_err());
    }

    #[test]
    fn test_auth_headers_carry_bearer_and_request_id() {
        let headers = auth_headers("tok-123").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-123");
        assert!(headers.contains_key("X-Request-Id"));
    }
}
