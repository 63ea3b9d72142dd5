//! Axum 인증 추출기.
//!
//! access token은 `accessToken` 쿠키 또는 `Authorization: Bearer` 헤더에서,
//! refresh token은 `refreshToken` 쿠키에서 읽습니다.
//!
//! ```rust,ignore
//! async fn protected(JwtAuth(claims): JwtAuth) -> impl IntoResponse {
//!     format!("principal {}", claims.subject)
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use auth_core::{AccessPolicy, Claims, RefreshContext, Role, RoleSet};

use super::cookie::{cookie_value, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::error::ApiError;
use crate::state::AppState;

/// 요청에서 access token 추출 (쿠키 우선).
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, ACCESS_COOKIE).or_else(|| bearer_token(headers))
}

/// `Authorization: Bearer <token>` 값.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// 요청에서 refresh token 추출.
pub fn refresh_token(headers: &HeaderMap) -> Option<&str> {
    cookie_value(headers, REFRESH_COOKIE)
}

/// 정책을 적용해 클레임을 얻습니다.
fn require(state: &AppState, headers: &HeaderMap, policy: AccessPolicy) -> Result<Option<Claims>, ApiError> {
    Ok(state.gate.enforce(policy, access_token(headers))?)
}

/// 인증된 주체의 클레임.
#[derive(Debug, Clone)]
pub struct JwtAuth(pub Claims);

impl FromRequestParts<Arc<AppState>> for JwtAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = state.gate.authenticate(access_token(&parts.headers))?;
        Ok(JwtAuth(claims))
    }
}

/// ADMIN 역할이 필요한 작업.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub Claims);

/// [`AdminAuth`]가 허용하는 역할.
pub const ADMIN_ONLY: RoleSet = RoleSet::only(Role::Admin);

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = require(state, &parts.headers, AccessPolicy::Roles(ADMIN_ONLY))?
            .ok_or(ApiError::Auth(auth_core::AuthError::Unauthenticated))?;
        Ok(AdminAuth(claims))
    }
}

/// 서버 측 레코드가 살아있는 refresh token (갱신용).
#[derive(Debug, Clone)]
pub struct RefreshAuth(pub RefreshContext);

impl FromRequestParts<Arc<AppState>> for RefreshAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let context = state
            .gate
            .authenticate_refresh(refresh_token(&parts.headers))
            .await?;
        Ok(RefreshAuth(context))
    }
}

/// 서명만 확인된 refresh token 클레임 (로그아웃용).
#[derive(Debug, Clone)]
pub struct RefreshClaims(pub Claims);

impl FromRequestParts<Arc<AppState>> for RefreshClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = state.gate.parse_refresh(refresh_token(&parts.headers))?;
        Ok(RefreshClaims(claims))
    }
}
