use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_POOLS_URL: &str = "https://yields.llama.fi/pools";
pub const DEFAULT_PROTOCOL_URL: &str = "https://api.llama.fi/protocol";
pub const DEFAULT_HISTORY_URL: &str = "https://yields.llama.fi/poolHistory";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiCfg {
    pub pools_url: String,
    pub protocol_url: String,
    pub history_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiCfg {
    fn default() -> Self {
        Self {
            pools_url: DEFAULT_POOLS_URL.to_string(),
            protocol_url: DEFAULT_PROTOCOL_URL.to_string(),
            history_url: DEFAULT_HISTORY_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    /// Decimal places for percentage columns
    pub decimals: usize,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiCfg,
    pub display: DisplayCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read config {}", path.as_ref().display()))?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        Ok(cfg)
    }
}

/// Effective settings after merging CLI > config file > defaults
#[derive(Debug, Clone)]
pub struct AppCfg {
    pub pools_url: String,
    pub protocol_url: String,
    pub history_url: String,
    pub timeout_secs: u64,
    pub decimals: usize,
}

/// CLI-level overrides, `None` keeps the lower-priority value
#[derive(Debug, Clone, Default)]
pub struct CfgOverrides {
    pub pools_url: Option<String>,
    pub protocol_url: Option<String>,
    pub history_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub decimals: Option<usize>,
}

impl AppCfg {
    pub fn from_config(cfg: Config, overrides: CfgOverrides) -> Self {
        Self {
            pools_url: overrides.pools_url.unwrap_or(cfg.api.pools_url),
            protocol_url: overrides.protocol_url.unwrap_or(cfg.api.protocol_url),
            history_url: overrides.history_url.unwrap_or(cfg.api.history_url),
            timeout_secs: overrides.timeout_secs.unwrap_or(cfg.api.timeout_secs),
            decimals: overrides.decimals.unwrap_or(cfg.display.decimals),
        }
    }

    /// Load the optional config file and apply overrides
    pub fn load(path: Option<&str>, overrides: CfgOverrides) -> Result<Self> {
        let cfg = match path {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        Ok(Self::from_config(cfg, overrides))
    }
}

impl Default for AppCfg {
    fn default() -> Self {
        Self::from_config(Config::default(), CfgOverrides::default())
    }
}
