//! Uniform outcome envelope returned by every CRUD operation.
//!
//! `OperationResult` is built once by the service layer and consumed once by
//! an inbound adapter. It has no mutators: the constructors are the only way
//! to produce one, which keeps the following invariants intact:
//!
//! - `success` is `true` exactly when `response_code` is in the 2xx range;
//! - `data` is only ever present on success;
//! - `errors` is only ever present on failure.

use serde::{Deserialize, Serialize};
use tracing::error;

use super::TraceId;

/// Response codes understood by inbound adapters.
///
/// Serialised as the bare numeric status (`200`, `404`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[non_exhaustive]
pub enum ResponseCode {
    Ok,
    Created,
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
}

impl ResponseCode {
    /// Numeric status value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
        }
    }

    /// Whether the code lies in the 2xx range.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.as_u16(), 200..=299)
    }
}

impl From<ResponseCode> for u16 {
    fn from(value: ResponseCode) -> Self {
        value.as_u16()
    }
}

/// Raised when deserialising a status value with no matching code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported response code: {0}")]
pub struct UnknownResponseCode(pub u16);

impl TryFrom<u16> for ResponseCode {
    type Error = UnknownResponseCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            200 => Self::Ok,
            201 => Self::Created,
            204 => Self::NoContent,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::InternalServerError,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            other => return Err(UnknownResponseCode(other)),
        };
        Ok(code)
    }
}

/// Outcome of a single service operation.
///
/// # Examples
/// ```
/// use usuario_api::domain::{OperationResult, ResponseCode};
///
/// let ok = OperationResult::success(true, "done");
/// assert!(ok.is_success());
/// assert_eq!(ok.data(), Some(&true));
///
/// let failed = OperationResult::<bool>::error(ResponseCode::NotFound, "missing");
/// assert!(!failed.is_success());
/// assert!(failed.data().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult<T> {
    response_code: ResponseCode,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

impl<T> OperationResult<T> {
    fn succeeded(code: ResponseCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            response_code: code,
            success: true,
            message: Some(message.into()),
            data,
            errors: None,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Successful outcome carrying `data` with [`ResponseCode::Ok`].
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self::succeeded(ResponseCode::Ok, Some(data), message)
    }

    /// Successful outcome for a freshly persisted resource.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::succeeded(ResponseCode::Created, Some(data), message)
    }

    /// Successful outcome that deliberately carries no payload.
    pub fn success_without_data(message: impl Into<String>) -> Self {
        Self::succeeded(ResponseCode::Ok, None, message)
    }

    /// Failed outcome without diagnostics.
    pub fn error(code: ResponseCode, message: impl Into<String>) -> Self {
        Self::failed(code, message, None)
    }

    /// Failed outcome carrying diagnostic strings.
    pub fn error_with(code: ResponseCode, message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::failed(code, message, Some(errors))
    }

    fn failed(code: ResponseCode, message: impl Into<String>, errors: Option<Vec<String>>) -> Self {
        let message = message.into();
        let code = if code.is_success() {
            error!(
                code = code.as_u16(),
                %message,
                "error result built with a success code; reporting internal server error"
            );
            ResponseCode::InternalServerError
        } else {
            code
        };
        Self {
            response_code: code,
            success: false,
            message: Some(message),
            data: None,
            errors,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    #[must_use]
    pub const fn response_code(&self) -> ResponseCode {
        self.response_code
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the result, yielding its payload.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    #[must_use]
    pub fn errors(&self) -> Option<&[String]> {
        self.errors.as_deref()
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(ResponseCode::Ok, true)]
    #[case(ResponseCode::Created, true)]
    #[case(ResponseCode::NoContent, true)]
    #[case(ResponseCode::BadRequest, false)]
    #[case(ResponseCode::NotFound, false)]
    #[case(ResponseCode::InternalServerError, false)]
    #[case(ResponseCode::ServiceUnavailable, false)]
    fn success_range_is_2xx(#[case] code: ResponseCode, #[case] expected: bool) {
        assert_eq!(code.is_success(), expected);
    }

    #[rstest]
    fn numeric_codes_survive_conversion() {
        for raw in [200_u16, 201, 204, 400, 401, 403, 404, 500, 502, 503] {
            let code = ResponseCode::try_from(raw).expect("known code");
            assert_eq!(u16::from(code), raw);
        }
        assert_eq!(ResponseCode::try_from(418), Err(UnknownResponseCode(418)));
    }

    #[rstest]
    fn success_carries_data_and_no_errors() {
        let result = OperationResult::success(vec![1, 2], "ok");
        assert_eq!(result.response_code(), ResponseCode::Ok);
        assert!(result.is_success());
        assert_eq!(result.data(), Some(&vec![1, 2]));
        assert!(result.errors().is_none());
    }

    #[rstest]
    fn success_without_data_omits_payload() {
        let result = OperationResult::<String>::success_without_data("gone");
        assert!(result.is_success());
        assert!(result.data().is_none());
        assert_eq!(result.message(), Some("gone"));
    }

    #[rstest]
    fn error_with_keeps_diagnostics() {
        let result = OperationResult::<bool>::error_with(
            ResponseCode::InternalServerError,
            "boom",
            vec!["duplicate key".to_owned()],
        );
        assert!(!result.is_success());
        assert!(result.data().is_none());
        assert_eq!(result.errors(), Some(&["duplicate key".to_owned()][..]));
    }

    #[rstest]
    fn error_with_success_code_is_coerced() {
        let result = OperationResult::<bool>::error(ResponseCode::Created, "not really");
        assert_eq!(result.response_code(), ResponseCode::InternalServerError);
        assert!(!result.is_success());

        let value = serde_json::to_value(&result).expect("serialise");
        assert_eq!(value.get("responseCode"), Some(&json!(500)));
        assert_eq!(value.get("success"), Some(&json!(false)));
    }

    #[rstest]
    fn serialises_camel_case_and_skips_absent_members() {
        let result = OperationResult::created(json!({ "idUsuario": 7 }), "saved");
        let value = serde_json::to_value(&result).expect("serialise");
        assert_eq!(
            value,
            json!({
                "responseCode": 201,
                "success": true,
                "message": "saved",
                "data": { "idUsuario": 7 },
            })
        );
        assert!(value.get("errors").is_none());
        assert!(value.get("traceId").is_none());
    }

    #[tokio::test]
    async fn captures_trace_id_in_scope() {
        let trace_id = TraceId::generate();
        let result = TraceId::scope(trace_id, async {
            OperationResult::<Value>::error(ResponseCode::NotFound, "missing")
        })
        .await;
        assert_eq!(result.trace_id(), Some(trace_id.to_string().as_str()));
    }
}
