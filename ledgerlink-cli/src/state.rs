//! Where ledgerlink keeps its files: `$LEDGERLINK_HOME`, or `~/.ledgerlink`.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::PathBuf;

const HOME_OVERRIDE: &str = "LEDGERLINK_HOME";

fn resolve_home(override_dir: Option<String>, home: Option<String>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    match home.filter(|h| !h.trim().is_empty()) {
        Some(h) => Ok(PathBuf::from(h).join(".ledgerlink")),
        None => bail!("neither {} nor HOME is set", HOME_OVERRIDE),
    }
}

/// The state directory, created on first use.
pub fn state_dir() -> Result<PathBuf> {
    let dir = resolve_home(std::env::var(HOME_OVERRIDE).ok(), std::env::var("HOME").ok())?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Saved statement-account → ledger-account mappings.
pub fn mappings_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("account-mappings.json"))
}
