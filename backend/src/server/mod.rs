//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use usuario_api::Trace;
use usuario_api::domain::ports::UsuarioCrud;
use usuario_api::domain::{Usuario, UsuarioCrudService};
use usuario_api::inbound::http::{HttpState, usuarios};
use usuario_api::outbound::memory::InMemoryStore;
use usuario_api::outbound::persistence::DieselUsuarioStore;

/// Pick the store behind the CRUD service.
///
/// Uses PostgreSQL when a pool is configured, otherwise an in-memory table
/// shared by every worker.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let usuarios: Arc<dyn UsuarioCrud> = match &config.db_pool {
        Some(pool) => Arc::new(UsuarioCrudService::new(Arc::new(DieselUsuarioStore::new(
            pool.clone(),
        )))),
        None => Arc::new(UsuarioCrudService::new(Arc::new(
            InMemoryStore::<Usuario>::new(),
        ))),
    };
    web::Data::new(HttpState::new(usuarios))
}

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(http_state)
        .wrap(Trace)
        .configure(usuarios::configure)
}

/// Construct an Actix HTTP server from `config`.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(config.bind_addr)?
        .run();
    Ok(server)
}
