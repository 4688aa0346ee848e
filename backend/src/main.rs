//! `usuario-api` entry point: loads settings, picks a store and serves the
//! `usuarios` REST endpoints.

mod server;

use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use usuario_api::outbound::persistence::DbPool;
use usuario_api::settings::AppSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load_from_iter(std::env::args_os()).wrap_err("failed to load settings")?;
    let mut config = ServerConfig::new(settings.bind_addr()?);
    match settings.pool_config() {
        Some(pool_config) => {
            let pool = DbPool::new(pool_config)
                .await
                .wrap_err("failed to build database pool")?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; using the in-memory store"),
    }

    let bind_addr = config.bind_addr();
    let server = create_server(config).wrap_err("failed to start HTTP server")?;
    info!(%bind_addr, "usuario-api listening");
    server.await.wrap_err("HTTP server terminated")
}
