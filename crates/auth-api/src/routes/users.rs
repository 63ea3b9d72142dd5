//! 사용자 관리 endpoint (ADMIN 전용).
//!
//! - `POST /users` - 주체 생성 (기본 역할 MANAGER, 토큰 미발급)

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use secrecy::SecretString;
use serde::Deserialize;

use auth_core::{Registration, Role, TenantId};

use crate::auth::AdminAuth;
use crate::error::{ApiError, ApiResult};
use crate::routes::auth::SessionResponse;
use crate::state::AppState;

/// 주체 생성 요청.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// 생략 시 manager
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
}

/// 주체 생성.
///
/// POST /users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let role = req
        .role
        .as_deref()
        .map(|r| Role::parse(r).ok_or_else(|| ApiError::BadRequest(format!("Unknown role: {r}"))))
        .transpose()?;

    let registration = Registration {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        password: SecretString::from(req.password),
        tenant_id: req.tenant_id.map(TenantId),
    };

    let principal = state.sessions.enroll(registration, role).await?;
    tracing::info!(admin = %admin.subject, principal_id = %principal.id, "User created by admin");

    Ok((StatusCode::CREATED, Json(SessionResponse { id: principal.id })))
}

/// 사용자 관리 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(create_user))
}
