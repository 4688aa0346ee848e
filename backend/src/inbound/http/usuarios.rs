//! `usuarios` API handlers.
//!
//! ```text
//! POST   /api/v1/usuarios {"nombre":"Ana","correo":"ana@x.com",...}
//! GET    /api/v1/usuarios
//! GET    /api/v1/usuarios/summaries
//! GET    /api/v1/usuarios/{id}
//! GET    /api/v1/usuarios/{id}/summary
//! PUT    /api/v1/usuarios/{id}?full=true
//! DELETE /api/v1/usuarios/{id}
//! ```
//!
//! Handlers only unwrap transport details and hand over to the
//! [`UsuarioCrud`](crate::domain::ports::UsuarioCrud) port; every response
//! body is the serialised [`OperationResult`](crate::domain::OperationResult).

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use crate::domain::{UpdateMode, UsuarioDto};
use crate::inbound::http::response::{respond, respond_created};
use crate::inbound::http::state::HttpState;

/// Query string of `PUT /api/v1/usuarios/{id}`.
///
/// `full` selects a full overwrite; `esActualizacionCompleta` is accepted as
/// an alias. Absent means partial.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuery {
    #[serde(default, alias = "esActualizacionCompleta")]
    pub full: bool,
}

/// Register every `usuarios` route under `/api/v1`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use usuario_api::inbound::http::usuarios;
///
/// let app = App::new().configure(usuarios::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(create_usuario)
            .service(list_usuarios)
            .service(list_summaries)
            .service(get_usuario)
            .service(get_summary)
            .service(update_usuario)
            .service(delete_usuario),
    );
}

/// Create a user.
///
/// A missing or unreadable JSON body reaches the port as `None`.
#[post("/usuarios")]
pub async fn create_usuario(
    state: web::Data<HttpState>,
    payload: Option<web::Json<UsuarioDto>>,
) -> HttpResponse {
    let result = state
        .usuarios
        .create(payload.map(web::Json::into_inner))
        .await;
    respond_created(&result)
}

#[get("/usuarios")]
pub async fn list_usuarios(state: web::Data<HttpState>) -> HttpResponse {
    respond(&state.usuarios.get_all().await)
}

#[get("/usuarios/summaries")]
pub async fn list_summaries(state: web::Data<HttpState>) -> HttpResponse {
    respond(&state.usuarios.get_all_summaries().await)
}

#[get("/usuarios/{id:\\d+}")]
pub async fn get_usuario(state: web::Data<HttpState>, path: web::Path<i32>) -> HttpResponse {
    respond(&state.usuarios.get_by_id(path.into_inner()).await)
}

#[get("/usuarios/{id:\\d+}/summary")]
pub async fn get_summary(state: web::Data<HttpState>, path: web::Path<i32>) -> HttpResponse {
    respond(&state.usuarios.get_summary_by_id(path.into_inner()).await)
}

/// Update a user, fully or partially depending on [`UpdateQuery`].
#[put("/usuarios/{id:\\d+}")]
pub async fn update_usuario(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    query: web::Query<UpdateQuery>,
    payload: Option<web::Json<UsuarioDto>>,
) -> HttpResponse {
    let mode = UpdateMode::from_full_flag(query.full);
    let result = state
        .usuarios
        .update(path.into_inner(), payload.map(web::Json::into_inner), mode)
        .await;
    respond(&result)
}

#[delete("/usuarios/{id:\\d+}")]
pub async fn delete_usuario(state: web::Data<HttpState>, path: web::Path<i32>) -> HttpResponse {
    respond(&state.usuarios.delete(path.into_inner()).await)
}
