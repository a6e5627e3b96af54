use anyhow::{Context, Result};

use crate::llm_client::LlmSettings;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    /// Cache backend URL. Read for parity with deployments that set it; nothing consumes it yet.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm: LlmSettings {
                api_url: require_env("LLM_API_URL")?,
                api_key: require_env("LLM_API_KEY")?,
            },
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
