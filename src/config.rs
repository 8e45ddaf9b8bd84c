// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Vaultbook", "vaultbook"));

pub const DB_ENV: &str = "VAULTBOOK_DB";
pub const BUSY_TIMEOUT_ENV: &str = "VAULTBOOK_BUSY_TIMEOUT_MS";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Where the ledger lives and how long a writer waits on a locked database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn at(path: impl AsRef<Path>) -> Self {
        StoreConfig {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    /// Resolves the database path: explicit flag, then `VAULTBOOK_DB`, then the
    /// platform data dir.
    pub fn resolve(flag: Option<&str>) -> Result<Self> {
        let env_path = std::env::var(DB_ENV).ok().filter(|s| !s.trim().is_empty());
        let env_timeout = std::env::var(BUSY_TIMEOUT_ENV).ok();
        Self::from_sources(flag, env_path.as_deref(), env_timeout.as_deref())
    }

    fn from_sources(
        flag: Option<&str>,
        env_path: Option<&str>,
        env_timeout: Option<&str>,
    ) -> Result<Self> {
        let path = match flag.or(env_path) {
            Some(p) => PathBuf::from(p.trim()),
            None => default_db_path()?,
        };
        let busy_timeout = match env_timeout {
            Some(raw) => {
                let ms = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid {} '{}'", BUSY_TIMEOUT_ENV, raw))?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        };
        Ok(StoreConfig { path, busy_timeout })
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("vaultbook.sqlite"))
}
