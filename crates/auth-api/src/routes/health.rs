//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이터의 liveness/readiness 확인용입니다.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

/// 헬스 체크 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" | "degraded"
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    /// ISO 8601
    pub timestamp: String,
    pub components: ComponentHealth,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub database: ComponentStatus,
    pub signing_keys: ComponentStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// "up" | "down" | "not_configured"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    pub fn up() -> Self {
        Self {
            status: "up".to_string(),
            message: None,
        }
    }

    pub fn up_with_info(message: impl Into<String>) -> Self {
        Self {
            status: "up".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: "down".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn not_configured() -> Self {
        Self {
            status: "not_configured".to_string(),
            message: None,
        }
    }
}

/// liveness probe.
///
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// readiness probe. 데이터베이스와 서명 키 상태를 확인합니다.
///
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut overall_status = "healthy";
    let mut status_code = StatusCode::OK;

    let database_status = if state.db_pool.is_some() {
        if state.is_db_healthy().await {
            ComponentStatus::up()
        } else {
            overall_status = "degraded";
            status_code = StatusCode::SERVICE_UNAVAILABLE;
            ComponentStatus::down("연결 실패")
        }
    } else {
        ComponentStatus::not_configured()
    };

    let signing_keys = match state.keys.active_kid() {
        Some(kid) => ComponentStatus::up_with_info(format!(
            "active kid {}, {} verification keys",
            kid,
            state.keys.jwks().keys.len()
        )),
        None => {
            overall_status = "degraded";
            status_code = StatusCode::SERVICE_UNAVAILABLE;
            ComponentStatus::down("활성 서명 키 없음")
        }
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: ComponentHealth {
            database: database_status,
            signing_keys,
        },
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
