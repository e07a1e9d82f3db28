use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{default_store_path, ensure_aura_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSection {
    /// IANA timezone used to decide what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSection {
    /// Task database file (default: ~/.aura/tasks.json)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSection {
    /// tracing filter, e.g. "warn" or "aura_core=debug". `AURA_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(p) => Ok(p.clone()),
            None => default_store_path(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_aura_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("Config: {}\n", config_path()?.display());
    println!("- general.timezone: {}", cfg.general.timezone);
    println!("- store.path: {}", cfg.store_path()?.display());
    println!("- log.level: {}", cfg.log.level);
    Ok(())
}
