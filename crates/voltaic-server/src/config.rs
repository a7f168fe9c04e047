// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Voltaic.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;
use voltaic_core::EngineConfig;

/// One year
pub const MAX_CLEANUP_INTERVAL_HOURS: u64 = 8760;
/// One hundred years
pub const MAX_SAMPLE_RETENTION_DAYS: u32 = 36_500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_sample_retention_days")]
    pub sample_retention_days: u32,
    /// How often old samples are purged
    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u64,
    /// JSON file with equipment records, inverters and racking to load at startup
    #[serde(default)]
    pub catalog_seed: Option<String>,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    8110
}

fn default_db_path() -> String {
    "./data/voltaic.db".to_owned()
}

fn default_sample_retention_days() -> u32 {
    365
}

fn default_cleanup_interval_hours() -> u64 {
    24
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            sample_retention_days: default_sample_retention_days(),
            cleanup_interval_hours: default_cleanup_interval_hours(),
            catalog_seed: None,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Read the config file, or fall back to defaults when it does not exist
    pub fn load(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            warn!(path, "Config file not found, using defaults");
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.bind_address.trim().is_empty() {
            bail!("server.bind_address must be set");
        }
        if self.database.path.trim().is_empty() {
            bail!("database.path must be set");
        }
        if !(1..=MAX_SAMPLE_RETENTION_DAYS).contains(&self.database.sample_retention_days) {
            bail!("database.sample_retention_days must be between 1 and {MAX_SAMPLE_RETENTION_DAYS}");
        }
        if !(1..=MAX_CLEANUP_INTERVAL_HOURS).contains(&self.database.cleanup_interval_hours) {
            bail!("database.cleanup_interval_hours must be between 1 and {MAX_CLEANUP_INTERVAL_HOURS}");
        }
        self.engine.validate()
    }
}
