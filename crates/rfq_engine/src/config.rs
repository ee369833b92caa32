use std::time::Duration;

use rfq_logging::rfq_warn;
use thiserror::Error;
use url::Url;

use crate::socket::ReconnectPolicy;

pub const API_URL_VAR: &str = "RFQ_API_URL";
/// Older deployments configured one screen through a second variable.
pub const LEGACY_API_URL_VAR: &str = "RFQ_FASTAPI_URL";
pub const WS_URL_VAR: &str = "RFQ_WS_URL";
pub const WEBSOCKET_ENABLED_VAR: &str = "RFQ_WEBSOCKET_ENABLED";
pub const RECONNECT_INTERVAL_VAR: &str = "RFQ_RECONNECT_INTERVAL_MS";
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var} value {value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings resolved once at startup.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub ws_base_url: Url,
    pub websocket_enabled: bool,
    pub reconnect: ReconnectPolicy,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Config for `api_base_url` with the socket base derived from it.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url = parse_base(API_URL_VAR, api_base_url, &["http", "https"])?;
        let ws_base_url = derive_ws_base(&api_base_url);
        Ok(Self {
            api_base_url,
            ws_base_url,
            websocket_enabled: true,
            reconnect: ReconnectPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the config through `lookup`, which maps variable names to
    /// values. Callers layer file settings under the environment this way.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = match (non_empty(API_URL_VAR), non_empty(LEGACY_API_URL_VAR)) {
            (Some(url), legacy) => {
                if legacy.as_ref().is_some_and(|legacy| legacy != &url) {
                    rfq_warn!(
                        "{} is ignored because {} is set",
                        LEGACY_API_URL_VAR,
                        API_URL_VAR
                    );
                }
                url
            }
            (None, Some(legacy)) => {
                rfq_warn!("{} is deprecated; use {}", LEGACY_API_URL_VAR, API_URL_VAR);
                legacy
            }
            (None, None) => DEFAULT_API_URL.to_string(),
        };

        let mut config = Self::new(api_url.trim())?;

        if let Some(ws_url) = non_empty(WS_URL_VAR) {
            config.ws_base_url = parse_base(WS_URL_VAR, ws_url.trim(), &["ws", "wss"])?;
        }
        if let Some(raw) = non_empty(WEBSOCKET_ENABLED_VAR) {
            config.websocket_enabled = parse_flag(WEBSOCKET_ENABLED_VAR, &raw)?;
        }
        if let Some(raw) = non_empty(RECONNECT_INTERVAL_VAR) {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: RECONNECT_INTERVAL_VAR,
                value: raw.clone(),
                reason: "expected milliseconds".to_string(),
            })?;
            config.reconnect.interval = Duration::from_millis(millis);
        }
        Ok(config)
    }

    /// REST endpoint below the API base, one path segment per element.
    pub fn api_url(&self, segments: &[&str]) -> Url {
        join_segments(&self.api_base_url, segments)
    }

    /// Socket endpoint for `path`, or `None` when real-time is switched off
    /// or the path is empty.
    pub fn socket_url(&self, path: &str) -> Option<Url> {
        if !self.websocket_enabled || path.trim().is_empty() {
            return None;
        }
        let segments: Vec<&str> = path.split('/').collect();
        Some(join_segments(&self.ws_base_url, &segments))
    }
}

fn parse_base(var: &'static str, raw: &str, schemes: &[&str]) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !schemes.contains(&url.scheme()) || url.cannot_be_a_base() {
        return Err(invalid(format!("expected a {} url", schemes.join("/"))));
    }
    Ok(url)
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

// Sockets live at the host root, not below the REST prefix.
fn derive_ws_base(api: &Url) -> Url {
    let mut ws = api.clone();
    let scheme = if api.scheme() == "https" { "wss" } else { "ws" };
    // http(s) -> ws(s) is always permitted between special schemes.
    let _ = ws.set_scheme(scheme);
    ws.set_path("/");
    ws.set_query(None);
    ws.set_fragment(None);
    ws
}

fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments.iter().filter(|segment| !segment.is_empty()));
    }
    url
}
