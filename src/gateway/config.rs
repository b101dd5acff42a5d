//! Gateway configuration parsed from environment variables.

use url::Url;

use super::types::GatewayError;

pub const DEFAULT_HOST_URL: &str = "http://127.0.0.1:4870/api/message";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Endpoint of the locally running generation host.
    pub host_url: Url,
    pub timeouts: GatewayTimeouts,
}

impl GatewayConfig {
    /// Build typed gateway config from environment variables.
    ///
    /// Optional:
    /// - `GITSUM_HOST_URL`: default `http://127.0.0.1:4870/api/message`
    /// - `GITSUM_REQUEST_TIMEOUT_SECS`: default 60
    /// - `GITSUM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Parse`] when `GITSUM_HOST_URL` is not a valid
    /// URL.
    pub fn from_env() -> Result<Self, GatewayError> {
        let raw_url = std::env::var("GITSUM_HOST_URL").unwrap_or_else(|_| DEFAULT_HOST_URL.to_string());
        let host_url =
            Url::parse(&raw_url).map_err(|e| GatewayError::Parse(format!("invalid GITSUM_HOST_URL: {e}")))?;

        let timeouts = GatewayTimeouts {
            request_secs: env_parse_u64("GITSUM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("GITSUM_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { host_url, timeouts })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host_url: Url::parse(DEFAULT_HOST_URL).expect("default URL is valid"),
            timeouts: GatewayTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
