use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::Span;

use crate::application::auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal server error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    err: &'a str,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            tracing::error!(%detail, "internal_error");
        }
        let message = self.to_string();
        (self.status_code(), Json(ErrorBody { err: &message })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::RegistrationDisabled | AuthError::LoginBlocked => {
                ApiError::Forbidden(e.to_string())
            }
            AuthError::InvalidCredentials | AuthError::Unauthorized => ApiError::Unauthorized,
            AuthError::AlreadyExists => ApiError::Conflict(e.to_string()),
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::Backend(f) => ApiError::Internal(f.to_string()),
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

/// Send-response helper handed to modules. Successful results are wrapped as
/// `{"data": ...}`; errors become `{"err": ...}` with the matching status and
/// are logged under the owning module's span.
#[derive(Clone, Debug)]
pub struct Responder {
    span: Span,
}

impl Responder {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    pub fn send<T: Serialize>(&self, result: Result<T, ApiError>) -> Response {
        match result {
            Ok(data) => Json(json!({ "data": data })).into_response(),
            Err(e) => {
                self.span.in_scope(|| {
                    tracing::warn!(status = %e.status_code(), error = %e, "module_request_failed");
                });
                e.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn responder_wraps_data_and_errors() {
        let responder = Responder::new(Span::none());

        let ok = responder.send(Ok(vec![1, 2]));
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_json(ok).await, json!({"data": [1, 2]}));

        let err = responder.send::<()>(Err(ApiError::NotFound("no such thing".into())));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(err).await, json!({"err": "no such thing"}));
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        let cases = [
            (AuthError::RegistrationDisabled, StatusCode::FORBIDDEN),
            (AuthError::LoginBlocked, StatusCode::FORBIDDEN),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::AlreadyExists, StatusCode::CONFLICT),
            (AuthError::Validation("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }
}
