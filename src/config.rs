use std::env;

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Missing key is not fatal at startup; generation reports it as an auth failure.
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub session_ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_upload_bytes: 10 * 1024 * 1024,
            port: 8080,
            session_ttl_minutes: crate::session::DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            api_base: env::var("ANTHROPIC_API_BASE").unwrap_or(defaults.api_base),
            model: env::var("FITLAB_MODEL").unwrap_or(defaults.model),
            max_tokens: env::var("FITLAB_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(defaults.max_tokens),
            max_upload_bytes: env::var("FITLAB_MAX_UPLOAD_MB")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_upload_bytes),
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(defaults.port),
            session_ttl_minutes: env::var("FITLAB_SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|m| (1..=525_600).contains(m))
                .unwrap_or(defaults.session_ttl_minutes),
        }
    }
}
