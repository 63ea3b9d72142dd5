//! 인증 endpoint.
//!
//! - `POST /auth/register` - 자가 가입 (CUSTOMER)
//! - `POST /auth/login` - 로그인
//! - `GET /auth/self` - 본인 정보
//! - `POST /auth/refresh` - 토큰 갱신 (refresh token 회전)
//! - `POST /auth/logout` - 로그아웃

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use auth_core::{Principal, PrincipalId, Registration, SessionTokens};

use crate::auth::{CookieSettings, JwtAuth, RefreshAuth, RefreshClaims, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::error::ApiResult;
use crate::state::AppState;

/// 가입 요청.
///
/// 테넌트는 받지 않습니다 (ADMIN의 `POST /users`로만 배정).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Registration {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: SecretString::from(req.password),
            tenant_id: None,
        }
    }
}

/// 로그인 요청.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 토큰 발급 응답 (토큰 자체는 쿠키로 전달).
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: PrincipalId,
}

/// 토큰 쌍을 담는 `Set-Cookie` 헤더.
fn session_cookies(
    cookies: &CookieSettings,
    tokens: &SessionTokens,
) -> AppendHeaders<[(axum::http::HeaderName, String); 2]> {
    AppendHeaders([
        (SET_COOKIE, cookies.set_cookie(ACCESS_COOKIE, &tokens.access)),
        (SET_COOKIE, cookies.set_cookie(REFRESH_COOKIE, &tokens.refresh)),
    ])
}

/// 자가 가입.
///
/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let tokens = state.sessions.register(req.into()).await?;

    Ok((
        StatusCode::CREATED,
        session_cookies(&state.cookies, &tokens),
        Json(SessionResponse {
            id: tokens.principal_id,
        }),
    ))
}

/// 로그인.
///
/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let tokens = state
        .sessions
        .login(&req.email, SecretString::from(req.password))
        .await?;

    Ok((
        session_cookies(&state.cookies, &tokens),
        Json(SessionResponse {
            id: tokens.principal_id,
        }),
    ))
}

/// 본인 정보 조회. 비밀번호 해시는 포함되지 않습니다.
///
/// GET /auth/self
pub async fn get_self(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
) -> ApiResult<Json<Principal>> {
    let principal = state.sessions.self_info(&claims).await?;
    Ok(Json(principal))
}

/// 토큰 갱신.
///
/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    RefreshAuth(context): RefreshAuth,
) -> ApiResult<impl IntoResponse> {
    let tokens = state.sessions.refresh(&context).await?;

    Ok((
        session_cookies(&state.cookies, &tokens),
        Json(SessionResponse {
            id: tokens.principal_id,
        }),
    ))
}

/// 로그아웃. refresh 레코드를 삭제하고 두 쿠키를 지웁니다.
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    RefreshClaims(claims): RefreshClaims,
) -> ApiResult<impl IntoResponse> {
    state.sessions.logout(&claims).await?;

    Ok((
        AppendHeaders([
            (SET_COOKIE, state.cookies.clear_cookie(ACCESS_COOKIE)),
            (SET_COOKIE, state.cookies.clear_cookie(REFRESH_COOKIE)),
        ]),
        Json(serde_json::json!({})),
    ))
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/self", get(get_self))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{
        body_json, cookie_header, post_json, register_customer, send, set_cookies, test_app,
    };
    use axum::{body::Body, http::Request};

    #[tokio::test]
    async fn test_register_sets_both_cookies() {
        let (app, _) = test_app();

        let response = send(
            &app,
            post_json(
                "/auth/register",
                serde_json::json!({
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "a@x.com",
                    "password": "password1"
                }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("accessToken="));
        assert!(cookies[0].contains("Max-Age=3600"));
        assert!(cookies[1].starts_with("refreshToken="));
        assert!(cookies[1].contains("Max-Age=31536000"));

        let body = body_json(response).await;
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn test_register_ignores_tenant_in_body() {
        let (app, _) = test_app();

        let response = send(
            &app,
            post_json(
                "/auth/register",
                serde_json::json!({
                    "firstName": "Eve",
                    "lastName": "Doe",
                    "email": "eve@x.com",
                    "password": "password1",
                    "tenantId": 42
                }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookies = set_cookies(&response);

        let me = send(
            &app,
            Request::builder()
                .uri("/auth/self")
                .header("cookie", cookie_header(&cookies))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let me = body_json(me).await;
        assert_eq!(me["role"], "customer");
        assert!(me.get("tenantId").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_bad_request() {
        let (app, _) = test_app();
        register_customer(&app, "a@x.com", "password1").await;

        let response = send(
            &app,
            post_json(
                "/auth/register",
                serde_json::json!({
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "a@x.com",
                    "password": "other"
                }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "DUPLICATE_CREDENTIAL");
    }

    #[tokio::test]
    async fn test_login_failures_have_identical_bodies() {
        let (app, _) = test_app();
        register_customer(&app, "a@x.com", "password1").await;

        let unknown = send(
            &app,
            post_json(
                "/auth/login",
                serde_json::json!({"email": "b@x.com", "password": "password1"}),
            ),
        )
        .await;
        let wrong = send(
            &app,
            post_json(
                "/auth/login",
                serde_json::json!({"email": "a@x.com", "password": "nope"}),
            ),
        )
        .await;

        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
        assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);

        let unknown = axum::body::to_bytes(unknown.into_body(), usize::MAX).await.unwrap();
        let wrong = axum::body::to_bytes(wrong.into_body(), usize::MAX).await.unwrap();
        assert_eq!(unknown, wrong);
    }

    #[tokio::test]
    async fn test_self_with_cookie_and_bearer() {
        let (app, _) = test_app();
        let cookies = register_customer(&app, "a@x.com", "password1").await;

        let response = send(
            &app,
            Request::builder()
                .uri("/auth/self")
                .header("cookie", cookie_header(&cookies))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["email"], "a@x.com");
        assert_eq!(body["role"], "customer");
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());

        let access = cookies[0]
            .split(';')
            .next()
            .and_then(|kv| kv.strip_prefix("accessToken="))
            .unwrap()
            .to_string();
        let response = send(
            &app,
            Request::builder()
                .uri("/auth/self")
                .header("authorization", format!("Bearer {access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_self_without_token_is_unauthorized() {
        let (app, _) = test_app();

        let response = send(
            &app,
            Request::builder()
                .uri("/auth/self")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_refresh_rotates_and_old_token_is_rejected() {
        let (app, _) = test_app();
        let cookies = register_customer(&app, "a@x.com", "password1").await;

        let refresh_request = |cookies: &[String]| {
            Request::builder()
                .method("POST")
                .uri("/auth/refresh")
                .header("cookie", cookie_header(cookies))
                .body(Body::empty())
                .unwrap()
        };

        let response = send(&app, refresh_request(&cookies)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let rotated = set_cookies(&response);
        assert_eq!(rotated.len(), 2);
        assert_ne!(rotated[1], cookies[1]);

        let replay = send(&app, refresh_request(&cookies)).await;
        assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

        let again = send(&app, refresh_request(&rotated)).await;
        assert_eq!(again.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_clears_cookies_and_revokes_refresh() {
        let (app, _) = test_app();
        let cookies = register_customer(&app, "a@x.com", "password1").await;

        let logout = |cookies: &[String]| {
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header("cookie", cookie_header(cookies))
                .body(Body::empty())
                .unwrap()
        };

        let response = send(&app, logout(&cookies)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = set_cookies(&response);
        assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));
        assert_eq!(body_json(response).await, serde_json::json!({}));

        let refresh = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/auth/refresh")
                .header("cookie", cookie_header(&cookies))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);

        // 이미 로그아웃된 토큰으로도 성공
        assert_eq!(send(&app, logout(&cookies)).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_without_refresh_cookie_is_unauthorized() {
        let (app, _) = test_app();

        let response = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
