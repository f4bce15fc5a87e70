use anyhow::{Context, Result};
use ledgerlink_core::KeywordRules;
use ledgerlink_ingest::ParserCommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::state_dir;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ledger: LedgerSection,
    pub parser: ParserCommand,
    pub matching: KeywordRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSection {
    /// Bank name put on accounts created from a prompt
    pub bank_tag: String,
    pub currency: String,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            bank_tag: "RBC".to_string(),
            currency: "CAD".to_string(),
        }
    }
}

/// Connection details that only ever come from the environment.
#[derive(Debug, Clone)]
pub struct Env {
    pub user_id: String,
    pub ledger_url: String,
    pub api_key: String,
}

impl Env {
    /// Read `USER_ID`, `LEDGER_URL` and `API_KEY`. Blank counts as missing.
    /// On failure returns the names that were missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Vec<&'static str>> {
        let mut missing = Vec::new();
        let mut get = |name: &'static str| match lookup(name).filter(|v| !v.trim().is_empty()) {
            Some(v) => v.trim().to_string(),
            None => {
                missing.push(name);
                String::new()
            }
        };
        let user_id = get("USER_ID");
        let ledger_url = get("LEDGER_URL");
        let api_key = get("API_KEY");
        if !missing.is_empty() {
            return Err(missing);
        }
        Ok(Self {
            user_id,
            ledger_url,
            api_key,
        })
    }

    pub fn from_process() -> Result<Self, Vec<&'static str>> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Load a `.env` file from the working directory or one of its parents into
/// the process environment. Variables that are already set are kept.
/// Returns the file that was loaded, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => Some(path),
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable .env file");
            None
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(state_dir()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
