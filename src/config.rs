use crate::logger::LogLevel;
use worker::Env;

/// Host probed when the request has no `host` parameter
pub const DEFAULT_HOST: &str = "www.cloudflare.com";

/// Deployment settings, read from `[vars]` in wrangler.toml
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub default_host: String,
    pub log_level: LogLevel,
}

impl Config {
    /// Missing or empty vars fall back to the built-in defaults
    pub fn new(default_host: Option<String>, log_level: Option<String>) -> Self {
        let default_host = default_host
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Config {
            default_host,
            log_level: LogLevel::from_header(&log_level.unwrap_or_default()),
        }
    }

    pub fn from_env(env: &Env) -> Self {
        Config::new(
            env.var("DEFAULT_HOST").ok().map(|v| v.to_string()),
            env.var("LOG_LEVEL").ok().map(|v| v.to_string()),
        )
    }
}
