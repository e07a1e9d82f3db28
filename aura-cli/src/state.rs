use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$AURA_HOME`, else `~/.aura`.
pub fn aura_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("AURA_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".aura"))
}

pub fn ensure_aura_home() -> Result<PathBuf> {
    let dir = aura_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_store_path() -> Result<PathBuf> {
    Ok(ensure_aura_home()?.join("tasks.json"))
}
