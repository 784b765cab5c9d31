//! Runtime configuration.
//!
//! Defaults are overridden by an optional `tcc.yaml` in the data directory,
//! which is in turn overridden by `TCC_*` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::Locale;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_FILE: &str = "tcc.yaml";
pub const ENV_DATA_DIR: &str = "TCC_DATA_DIR";
pub const ENV_BIND_ADDR: &str = "TCC_BIND_ADDR";
pub const ENV_SEED_SAMPLE_DATA: &str = "TCC_SEED_SAMPLE_DATA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    /// Load demo records into an empty database
    pub seed_sample_data: bool,
    pub default_locale: Locale,
}

/// Keys a `tcc.yaml` may set; anything left out keeps its current value
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    bind_addr: Option<SocketAddr>,
    seed_sample_data: Option<bool>,
    default_locale: Option<Locale>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            seed_sample_data: false,
            default_locale: Locale::default(),
        }
    }
}

/// `<Documents>/TCC School`, falling back to the home directory, then the working directory
pub fn default_data_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("TCC School")
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Build the configuration from defaults, the config file and the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an injectable environment lookup
    pub fn load_with<F>(env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();
        if let Some(dir) = env(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        config.apply_file(&config.data_dir.join(CONFIG_FILE))?;

        if let Some(addr) = env(ENV_BIND_ADDR) {
            config.bind_addr = addr
                .trim()
                .parse()
                .with_context(|| format!("{} is not a socket address: {}", ENV_BIND_ADDR, addr))?;
        }
        if let Some(flag) = env(ENV_SEED_SAMPLE_DATA) {
            config.seed_sample_data = parse_flag(&flag)
                .with_context(|| format!("{} must be true or false, got {}", ENV_SEED_SAMPLE_DATA, flag))?;
        }

        info!("Configuration: data dir {:?}, listening on {}", config.data_dir, config.bind_addr);
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            debug!("No config file at {:?}", path);
            return Ok(());
        }

        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let file: ConfigFile = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        debug!("Loaded config file {:?}", path);

        if let Some(addr) = file.bind_addr {
            self.bind_addr = addr;
        }
        if let Some(seed) = file.seed_sample_data {
            self.seed_sample_data = seed;
        }
        if let Some(locale) = file.default_locale {
            self.default_locale = locale;
        }
        Ok(())
    }
}
