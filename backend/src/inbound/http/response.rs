//! Translation of [`OperationResult`] values into HTTP responses.
//!
//! The body is always the serialised result; only the status line and the
//! `Location` header of created resources are derived from it.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use serde::Serialize;

use crate::domain::{OperationResult, ResponseCode, UsuarioDto};

/// Collection path of the `usuarios` resource.
pub const USUARIOS_PATH: &str = "/api/v1/usuarios";

/// Transport status for a domain response code.
///
/// Codes without a dedicated mapping are reported as internal errors.
#[must_use]
pub const fn status_for(code: ResponseCode) -> StatusCode {
    match code {
        ResponseCode::Created => StatusCode::CREATED,
        ResponseCode::Ok => StatusCode::OK,
        ResponseCode::BadRequest => StatusCode::BAD_REQUEST,
        ResponseCode::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render `result` with the status derived from its response code.
pub fn respond<T: Serialize>(result: &OperationResult<T>) -> HttpResponse {
    HttpResponse::build(status_for(result.response_code())).json(result)
}

/// Like [`respond`], adding a `Location` header when a user was created.
pub fn respond_created(result: &OperationResult<UsuarioDto>) -> HttpResponse {
    let mut builder = HttpResponse::build(status_for(result.response_code()));
    if result.response_code() == ResponseCode::Created {
        if let Some(dto) = result.data() {
            builder.insert_header((LOCATION, format!("{USUARIOS_PATH}/{}", dto.id_usuario)));
        }
    }
    builder.json(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ResponseCode::Created, StatusCode::CREATED)]
    #[case(ResponseCode::Ok, StatusCode::OK)]
    #[case(ResponseCode::BadRequest, StatusCode::BAD_REQUEST)]
    #[case(ResponseCode::NotFound, StatusCode::NOT_FOUND)]
    #[case(ResponseCode::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ResponseCode::Forbidden, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ResponseCode::NoContent, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(ResponseCode::ServiceUnavailable, StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_response_codes(#[case] code: ResponseCode, #[case] expected: StatusCode) {
        assert_eq!(status_for(code), expected);
    }

    #[test]
    fn created_results_point_at_the_new_resource() {
        let dto = UsuarioDto {
            id_usuario: 42,
            ..UsuarioDto::default()
        };
        let response = respond_created(&OperationResult::created(dto, "ok"));

        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers().get(LOCATION).and_then(|v| v.to_str().ok());
        assert_eq!(location, Some("/api/v1/usuarios/42"));
    }

    #[test]
    fn failed_creates_carry_no_location() {
        let result = OperationResult::<UsuarioDto>::error(ResponseCode::BadRequest, "vacío");
        let response = respond_created(&result);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(LOCATION).is_none());
    }
}
