//! Configuration loading for Typesense UI.
//!
//! Config lives in a TOML file (default `typesense-ui.toml`). A `.env` file is
//! honoured via `dotenvy`, and `TYPESENSE_*` variables override the saved
//! connection so credentials never have to be written to disk.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_FILE: &str = "typesense-ui.toml";
pub const CONFIG_PATH_ENV: &str = "TYPESENSE_UI_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => bail!("unsupported protocol '{other}' (expected http or https)"),
        }
    }
}

/// Where and how to reach a Typesense node.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub api_key: String,
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub connection_timeout_seconds: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            host: "localhost".to_string(),
            port: 8108,
            protocol: Protocol::Http,
            connection_timeout_seconds: 5,
        }
    }
}

impl ConnectionConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

// Keep the API key out of logs and panic messages.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("connection_timeout_seconds", &self.connection_timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Filter directive; empty means fall back to `RUST_LOG`.
    pub level: String,
    /// Optional log file; stderr only when empty.
    pub file: String,
    /// `hourly`, `daily`, `minutely` or `never`.
    pub roll: String,
    /// `text` or `json` for the stderr layer.
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: String::new(),
            file: String::new(),
            roll: "daily".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connection: Option<ConnectionConfig>,
    pub logging: LoggingSection,
}

/// Resolve the config path: explicit argument, then `TYPESENSE_UI_CONFIG`, then the default file.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(
        || {
            std::env::var_os(CONFIG_PATH_ENV)
                .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
        },
        Path::to_path_buf,
    )
}

/// Load config from disk (if present) and apply `TYPESENSE_*` overrides.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    let path = config_path(path);
    let mut cfg = read_config_file(&path)?;
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

/// Read just the file, without environment overrides. Missing file yields defaults.
pub fn read_config_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found; using defaults");
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))
}

pub fn save_config(path: &Path, cfg: &AppConfig) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context("create config directory")?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write config file {}", path.display()))
}

/// Remember `conn` as the saved connection, keeping the rest of the file intact.
pub fn save_connection(path: &Path, conn: &ConnectionConfig) -> Result<()> {
    let mut cfg = read_config_file(path)?;
    cfg.connection = Some(conn.clone());
    save_config(path, &cfg)
}

/// Forget the saved connection. No-op when no config file exists.
pub fn clear_connection(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let mut cfg = read_config_file(path)?;
    cfg.connection = None;
    save_config(path, &cfg)
}

pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("TYPESENSE_HOST");
    let port = lookup("TYPESENSE_PORT");
    let protocol = lookup("TYPESENSE_PROTOCOL");
    let api_key = lookup("TYPESENSE_API_KEY");
    let timeout = lookup("TYPESENSE_TIMEOUT_SECONDS");

    if host.is_none()
        && port.is_none()
        && protocol.is_none()
        && api_key.is_none()
        && timeout.is_none()
    {
        return Ok(());
    }

    let conn = cfg.connection.get_or_insert_with(ConnectionConfig::default);
    if let Some(host) = host {
        conn.host = host;
    }
    if let Some(port) = port {
        conn.port = port
            .parse()
            .with_context(|| format!("TYPESENSE_PORT is not a valid port: {port}"))?;
    }
    if let Some(protocol) = protocol {
        conn.protocol = protocol.parse()?;
    }
    if let Some(api_key) = api_key {
        conn.api_key = api_key;
    }
    if let Some(timeout) = timeout {
        conn.connection_timeout_seconds = timeout
            .parse()
            .with_context(|| format!("TYPESENSE_TIMEOUT_SECONDS is not a number: {timeout}"))?;
    }
    Ok(())
}
