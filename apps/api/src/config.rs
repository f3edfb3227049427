use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// LLM credentials are optional at startup: the server can still serve
/// health checks, session CRUD, and the fallback outline without them.
/// A missing credential surfaces as a configuration error on the first
/// generation call instead of a boot failure.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub llm_org_id: Option<String>,
    pub assistant_id: Option<String>,
    pub webhook_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: optional_env("LLM_API_KEY"),
            llm_org_id: optional_env("LLM_ORG_ID"),
            assistant_id: optional_env("LLM_ASSISTANT_ID"),
            webhook_url: optional_env("ANALYTICS_WEBHOOK_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
