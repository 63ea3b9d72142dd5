//! API 에러 응답.
//!
//! 모든 엔드포인트는 `{ "code": "...", "message": "..." }` 형식으로 실패를 알립니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use auth_core::AuthError;

/// API 에러 응답 본문.
///
/// ```json
/// { "code": "INVALID_CREDENTIALS", "message": "Email or password not match" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub code: String,
    pub message: String,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// 핸들러 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// 요청 본문 검증 실패
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::DuplicateCredential
                | AuthError::PrincipalNotFound => StatusCode::BAD_REQUEST,
                AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::StorageFailure | AuthError::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn body(&self) -> ApiErrorResponse {
        match self {
            ApiError::Auth(err) => ApiErrorResponse::new(err.code(), err.to_string()),
            ApiError::BadRequest(message) => ApiErrorResponse::new("BAD_REQUEST", message.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// API 핸들러 Result 타입.
pub type ApiResult<T> = Result<T, ApiError>;
