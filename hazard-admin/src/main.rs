//! hazard-admin - administration server for hazard categories and
//! technical recommendations
//!
//! Startup: tracing, configuration (CLI → env → TOML → defaults), build
//! identification, database initialization, then the HTTP server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hazard_admin::{build_router, AppState};
use hazard_common::config::{load_toml_config, AdminConfig};
use hazard_common::db::init_database;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

/// Command-line arguments for hazard-admin
#[derive(Parser, Debug)]
#[command(name = "hazard-admin")]
#[command(about = "Administration interface for hazard categories and technical recommendations")]
#[command(version)]
struct Args {
    /// Root folder holding the database
    #[arg(short, long, env = "HAZARD_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Address to listen on (e.g. 127.0.0.1:6543)
    #[arg(short, long, env = "HAZARD_ADMIN_BIND")]
    bind: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing comes first so config loading is logged; the configured level
    // is applied once the config is known unless RUST_LOG is set
    let env_override = EnvFilter::try_from_default_env().ok();
    let has_env_override = env_override.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_override.unwrap_or_else(|| EnvFilter::new("info,tower_http=info")),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let toml_config = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    let config = AdminConfig::resolve(
        args.root_folder.as_deref(),
        args.bind.as_deref(),
        &toml_config,
    );

    if !has_env_override {
        filter_handle
            .reload(EnvFilter::new(format!("{},tower_http=info", config.log_level)))
            .context("Failed to apply configured log level")?;
    }

    // Build identification
    info!(
        "Starting hazard-admin v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Root folder: {}", config.root_folder.display());
    config.ensure_root_folder()?;
    info!("Database path: {}", config.database_path.display());

    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(pool));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("hazard-admin listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
