use std::env;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub search_debounce: Duration,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = env::var("API_BASE_URL").context("API_BASE_URL is not set")?;
        let api_token = env::var("API_TOKEN").ok().filter(|t| !t.trim().is_empty());
        let search_debounce = env::var("SEARCH_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300);
        let request_timeout = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        Ok(Self {
            api_base_url,
            api_token,
            search_debounce: Duration::from_millis(search_debounce),
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}
