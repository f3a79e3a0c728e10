use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Portal configuration loaded from environment variables (and `.env` if present).
/// Every variable has a default; malformed numbers abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL for the public job/resume/evaluation/auth endpoints.
    pub api_base_url: String,
    /// Backend base URL for the `/admin/*` endpoints used by the placement dashboard.
    pub admin_api_base_url: String,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
    /// Idle time after which a browser session is dropped.
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let admin_api_base_url = std::env::var("ADMIN_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| format!("{api_base_url}/api/v1"));

        Ok(Config {
            api_base_url,
            admin_api_base_url,
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT_SECS", 30)?),
            health_timeout: Duration::from_secs(parse_env("HEALTH_TIMEOUT_SECS", 5)?),
            session_ttl: Duration::from_secs(parse_env("SESSION_TTL_SECS", 3600)?),
            session_sweep_interval: Duration::from_secs(parse_env("SESSION_SWEEP_SECS", 300)?),
            port: parse_env("PORT", 8501)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Configuration pointing at a single backend, used by tests against a mock server.
    #[cfg(test)]
    pub fn for_backend(base_url: &str) -> Self {
        let api_base_url = base_url.trim_end_matches('/').to_string();
        Config {
            admin_api_base_url: format!("{api_base_url}/api/v1"),
            api_base_url,
            request_timeout: Duration::from_secs(5),
            health_timeout: Duration::from_secs(1),
            session_ttl: Duration::from_secs(3600),
            session_sweep_interval: Duration::from_secs(300),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
