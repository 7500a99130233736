//! Configuration module for environment variable parsing.
//!
//! Secrets are optional at startup: a missing Graph API credential only
//! surfaces when a reply is sent, and a missing verify token makes every
//! handshake fail.

use std::env;
use tracing::warn;
use url::Url;

/// Default Graph API origin.
pub const DEFAULT_GRAPH_API_BASE_URL: &str = "https://graph.facebook.com";

/// Graph API version used for the message-send endpoint.
pub const DEFAULT_GRAPH_API_VERSION: &str = "v19.0";

/// Default inbound body limit (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the Graph API (`META_TOKEN`)
    pub meta_token: Option<String>,

    /// WhatsApp Business phone number id (`PHONE_ID`)
    pub phone_id: Option<String>,

    /// Shared secret for the subscription handshake (`VERIFY_TOKEN`)
    pub verify_token: Option<String>,

    /// Port for the web server to listen on
    pub port: u16,

    /// Graph API origin, without a trailing slash
    pub graph_api_base_url: String,

    /// Graph API version path segment
    pub graph_api_version: String,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Largest inbound webhook body that is read; larger bodies are acknowledged unread
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            meta_token: parse_secret("META_TOKEN"),

            phone_id: parse_secret("PHONE_ID"),

            verify_token: parse_secret("VERIFY_TOKEN"),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            graph_api_base_url: parse_base_url("GRAPH_API_BASE_URL", DEFAULT_GRAPH_API_BASE_URL),

            graph_api_version: parse_secret("GRAPH_API_VERSION")
                .unwrap_or_else(|| DEFAULT_GRAPH_API_VERSION.to_string()),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(8000),

            max_body_bytes: env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|bytes| *bytes > 0)
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        }
    }

    /// Full URL of the message-send endpoint, if a phone id is configured.
    pub fn messages_endpoint(&self) -> Option<String> {
        self.phone_id.as_ref().map(|phone_id| {
            format!(
                "{}/{}/{}/messages",
                self.graph_api_base_url, self.graph_api_version, phone_id
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            meta_token: None,
            phone_id: None,
            verify_token: None,
            port: 8080,
            graph_api_base_url: DEFAULT_GRAPH_API_BASE_URL.to_string(),
            graph_api_version: DEFAULT_GRAPH_API_VERSION.to_string(),
            request_timeout_ms: 8000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Read an optional string variable, treating blank values as unset.
fn parse_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a base URL, falling back to the default when it does not parse.
fn parse_base_url(name: &str, default: &str) -> String {
    let raw = match parse_secret(name) {
        Some(v) => v,
        None => return default.to_string(),
    };

    match Url::parse(&raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            raw.trim_end_matches('/').to_string()
        }
        _ => {
            warn!(env_var = name, value = %raw, "Invalid base URL, using default");
            default.to_string()
        }
    }
}
