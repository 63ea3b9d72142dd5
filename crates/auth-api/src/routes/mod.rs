//! REST API 라우트.
//!
//! - `/health` - 헬스 체크
//! - `/auth` - 가입, 로그인, 갱신, 로그아웃
//! - `/users` - ADMIN 전용 사용자 생성
//! - `/.well-known/jwks.json` - 공개키

pub mod auth;
pub mod health;
pub mod jwks;
pub mod users;

pub use auth::auth_router;
pub use health::{health_router, HealthResponse};
pub use jwks::jwks_router;
pub use users::users_router;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/auth", auth_router())
        .nest("/users", users_router())
        .merge(jwks_router())
}

/// 라우트 테스트 공용 헬퍼.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::SET_COOKIE, Request, Response, StatusCode},
        Router,
    };
    use tower::ServiceExt;

    use super::create_api_router;
    use crate::state::{create_test_state, AppState};

    pub fn test_app() -> (Router, Arc<AppState>) {
        let state = Arc::new(create_test_state());
        (create_api_router().with_state(state.clone()), state)
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
        app.clone().oneshot(request).await.unwrap()
    }

    pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// `Set-Cookie` 목록을 요청용 `Cookie` 헤더 값으로 변환.
    pub fn cookie_header(cookies: &[String]) -> String {
        cookies
            .iter()
            .filter_map(|c| c.split(';').next())
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// CUSTOMER 가입 후 발급된 쿠키 (access, refresh 순).
    pub async fn register_customer(app: &Router, email: &str, password: &str) -> Vec<String> {
        let response = send(
            app,
            post_json(
                "/auth/register",
                serde_json::json!({
                    "firstName": "Test",
                    "lastName": "User",
                    "email": email,
                    "password": password
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        set_cookies(&response)
    }

    pub async fn login(app: &Router, email: &str, password: &str) -> Vec<String> {
        let response = send(
            app,
            post_json(
                "/auth/login",
                serde_json::json!({"email": email, "password": password}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        set_cookies(&response)
    }
}
