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


use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use voltaic_core::VoltaicService;
use voltaic_server::api::{self, ApiState};
use voltaic_server::config::ServerConfig;
use voltaic_store::{CatalogSeed, SqliteStore};

#[derive(Debug, Parser)]
#[command(name = "voltaic-server")]
#[command(version, about = "Equipment compatibility and performance analytics server")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,
}

fn load_catalog(store: &SqliteStore, path: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog seed: {path}"))?;
    let seed: CatalogSeed =
        serde_json::from_str(&content).with_context(|| format!("Invalid catalog seed: {path}"))?;
    store.import_catalog(&seed)
}

fn spawn_retention(store: Arc<SqliteStore>, retention_days: u32, interval_hours: u64) {
    tokio::spawn(async move {
        let period = Duration::from_secs(interval_hours.saturating_mul(3600));
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match store.cleanup_old_samples(retention_days) {
                Ok(deleted) if deleted > 0 => {
                    info!(deleted, retention_days, "Cleaned up old samples");
                }
                Err(e) => {
                    error!(error = %e, "Failed to clean up old samples");
                }
                Ok(_) => {}
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!(path = %cli.config, "Loading configuration");
    let config = ServerConfig::load(&cli.config)?;

    let store = Arc::new(SqliteStore::open(&config.database.path)?);
    info!(path = %config.database.path, "Database opened");
    if let Some(seed) = &config.database.catalog_seed {
        load_catalog(&store, seed)?;
    }

    spawn_retention(
        Arc::clone(&store),
        config.database.sample_retention_days,
        config.database.cleanup_interval_hours,
    );

    let service = Arc::new(VoltaicService::new(
        config.engine.clone(),
        store.clone(),
        store.clone(),
        store,
    ));
    let app = api::router(ApiState { service });

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Voltaic server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
