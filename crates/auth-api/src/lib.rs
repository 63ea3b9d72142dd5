//! 인증 서비스 HTTP 경계.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 토큰 쿠키와 Bearer 헤더 해석
//! - Postgres 저장소
//! - 헬스 체크 엔드포인트
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 쿠키 및 인증 추출기
//! - [`repository`]: `auth-core` 저장소 계약의 Postgres 구현
//! - [`error`]: API 에러 응답

pub mod auth;
pub mod error;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{AdminAuth, CookieSettings, JwtAuth, RefreshAuth, RefreshClaims};
pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use routes::*;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
