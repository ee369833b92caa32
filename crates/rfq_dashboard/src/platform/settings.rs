use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rfq_engine::{
    ClientConfig, ConfigError, API_URL_VAR, RECONNECT_INTERVAL_VAR, WEBSOCKET_ENABLED_VAR,
    WS_URL_VAR,
};
use rfq_logging::{parse_level, LevelFilter};
use serde::Deserialize;

const SETTINGS_FILENAME: &str = "rfq_dashboard.ron";
pub const SETTINGS_PATH_VAR: &str = "RFQ_DASHBOARD_CONFIG";
pub const LOG_LEVEL_VAR: &str = "RFQ_LOG_LEVEL";

/// Optional settings file. Every value can be overridden by its environment
/// variable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: Option<String>,
    pub ws_url: Option<String>,
    pub websocket_enabled: Option<bool>,
    pub reconnect_interval_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_to_terminal: bool,
    pub download_dir: Option<PathBuf>,
}

pub fn settings_path<F>(env: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    env(SETTINGS_PATH_VAR)
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".").join(SETTINGS_FILENAME))
}

/// Reads the settings file; a missing file yields defaults.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Settings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read settings from {path:?}"));
        }
    };
    ron::from_str(&content).with_context(|| format!("failed to parse settings from {path:?}"))
}

impl Settings {
    fn file_value(&self, var: &str) -> Option<String> {
        match var {
            API_URL_VAR => self.api_url.clone(),
            WS_URL_VAR => self.ws_url.clone(),
            WEBSOCKET_ENABLED_VAR => self.websocket_enabled.map(|flag| flag.to_string()),
            RECONNECT_INTERVAL_VAR => self.reconnect_interval_ms.map(|ms| ms.to_string()),
            _ => None,
        }
    }

    pub fn client_config<F>(&self, env: F) -> Result<ClientConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        ClientConfig::from_lookup(|var| env(var).or_else(|| self.file_value(var)))
    }

    pub fn log_level<F>(&self, env: F) -> LevelFilter
    where
        F: Fn(&str) -> Option<String>,
    {
        env(LOG_LEVEL_VAR)
            .and_then(|raw| parse_level(&raw))
            .or_else(|| self.log_level.as_deref().and_then(parse_level))
            .unwrap_or(LevelFilter::Info)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("downloads")
        })
    }
}
