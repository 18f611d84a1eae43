use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

fn default_token_url() -> String {
    "http://127.0.0.1:9100".to_string()
}

fn default_permission_url() -> String {
    "http://127.0.0.1:9101".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_cache_capacity() -> u64 {
    10_000
}

/// Settings for the remote token/permission clients and the decision cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the token service.
    #[serde(default = "default_token_url")]
    pub token_service_url: String,
    /// Base URL of the permission service.
    #[serde(default = "default_permission_url")]
    pub permission_service_url: String,
    /// Timeout applied to every outgoing service call, in seconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    /// How long a cached permission/role decision stays valid, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Upper bound on cached decisions.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_service_url: default_token_url(),
            permission_service_url: default_permission_url(),
            http_timeout_secs: default_http_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl AuthConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// Variables: `AUTHGATE_TOKEN_URL`, `AUTHGATE_PERMISSION_URL`,
    /// `AUTHGATE_HTTP_TIMEOUT`, `AUTHGATE_CACHE_TTL`, `AUTHGATE_CACHE_CAPACITY`.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Ok(url) = std::env::var("AUTHGATE_TOKEN_URL") {
            cfg.token_service_url = url;
        }
        if let Ok(url) = std::env::var("AUTHGATE_PERMISSION_URL") {
            cfg.permission_service_url = url;
        }
        if let Ok(raw) = std::env::var("AUTHGATE_HTTP_TIMEOUT") {
            cfg.http_timeout_secs = raw.parse().context("parsing AUTHGATE_HTTP_TIMEOUT")?;
        }
        if let Ok(raw) = std::env::var("AUTHGATE_CACHE_TTL") {
            cfg.cache_ttl_secs = raw.parse().context("parsing AUTHGATE_CACHE_TTL")?;
        }
        if let Ok(raw) = std::env::var("AUTHGATE_CACHE_CAPACITY") {
            cfg.cache_capacity = raw.parse().context("parsing AUTHGATE_CACHE_CAPACITY")?;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a JSON config file; absent fields keep their defaults.
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).context("reading config file")?;
        let cfg: AuthConfig = serde_json::from_str(&raw).context("parsing JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.http_timeout_secs == 0 {
            bail!("http_timeout_secs must be non-zero");
        }
        if self.cache_ttl_secs == 0 {
            bail!("cache_ttl_secs must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, OnceLock};
    use tempfile::NamedTempFile;

    // Env-reading tests share process state; serialize them.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        }
    }

    fn clear_env() {
        std::env::remove_var("AUTHGATE_TOKEN_URL");
        std::env::remove_var("AUTHGATE_PERMISSION_URL");
        std::env::remove_var("AUTHGATE_HTTP_TIMEOUT");
        std::env::remove_var("AUTHGATE_CACHE_TTL");
        std::env::remove_var("AUTHGATE_CACHE_CAPACITY");
    }

    #[test]
    fn test_from_env_defaults() {
        let _g = lock_env();
        clear_env();

        let cfg = AuthConfig::from_env().unwrap();
        assert_eq!(cfg.token_service_url, "http://127.0.0.1:9100");
        assert_eq!(cfg.permission_service_url, "http://127.0.0.1:9101");
        assert_eq!(cfg.cache_ttl_secs, 60);
        assert_eq!(cfg.cache_capacity, 10_000);
    }

    #[test]
    fn test_from_env_overrides() {
        let _g = lock_env();
        clear_env();
        std::env::set_var("AUTHGATE_TOKEN_URL", "http://token.internal:8000");
        std::env::set_var("AUTHGATE_CACHE_TTL", "120");

        let cfg = AuthConfig::from_env().unwrap();
        assert_eq!(cfg.token_service_url, "http://token.internal:8000");
        assert_eq!(cfg.cache_ttl_secs, 120);

        clear_env();
    }

    #[test]
    fn test_from_env_rejects_zero_ttl() {
        let _g = lock_env();
        clear_env();
        std::env::set_var("AUTHGATE_CACHE_TTL", "0");

        let result = AuthConfig::from_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    fn test_config_file_parsing() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "token_service_url": "http://auth.example.com",
                "permission_service_url": "http://perm.example.com",
                "cache_ttl_secs": 30
            }}"#
        )
        .unwrap();

        let cfg = AuthConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.token_service_url, "http://auth.example.com");
        assert_eq!(cfg.permission_service_url, "http://perm.example.com");
        assert_eq!(cfg.cache_ttl_secs, 30);
        // untouched fields fall back
        assert_eq!(cfg.http_timeout_secs, 10);
    }

    #[test]
    fn test_config_missing_file() {
        let result = AuthConfig::from_file("/nonexistent/path/authgate.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{invalid json").unwrap();

        let result = AuthConfig::from_file(file.path().to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_rejects_zero_timeout() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"http_timeout_secs": 0}}"#).unwrap();

        let result = AuthConfig::from_file(file.path().to_str().unwrap());
        assert!(result.is_err());
    }
}
