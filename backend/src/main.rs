//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use clinic_backend::inbound::http::health::HealthState;
use clinic_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{AppSettings, BuildMode, ServerConfig, create_server};

/// Apply pending migrations and open the connection pool.
async fn connect_database(url: &str, max_size: u32) -> io::Result<DbPool> {
    let applied = run_pending_migrations(url)
        .await
        .map_err(io::Error::other)?;
    if !applied.is_empty() {
        info!(migrations = ?applied, "applied database migrations");
    }
    DbPool::new(PoolConfig::new(url).with_max_size(max_size))
        .await
        .map_err(io::Error::other)
}

/// Turn loaded settings into a server configuration, connecting to the
/// database when one is configured.
async fn server_config(settings: &AppSettings) -> io::Result<ServerConfig> {
    let key = settings
        .session_key(BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let admin_account = settings.admin_account().map_err(io::Error::other)?;
    let session_ttl = settings.session_ttl().map_err(io::Error::other)?;

    let config = ServerConfig::new(key, settings.cookie_secure(), bind_addr, admin_account)
        .with_session_ttl(session_ttl)
        .with_utc_offset_minutes(settings.utc_offset_minutes());

    match settings.database_url() {
        Some(url) => {
            let pool = connect_database(url, settings.pool_max_size()).await?;
            Ok(config.with_db_pool(pool))
        }
        None => Ok(config),
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(e.to_string()))?;
    let config = server_config(&settings).await?;
    info!(addr = %config.bind_addr, "starting clinic backend");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
