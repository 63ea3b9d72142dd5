//! 공개키 배포 endpoint.
//!
//! GET /.well-known/jwks.json

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use auth_core::JwkSet;

use crate::state::AppState;

/// 검증 가능한 모든 공개키.
pub async fn jwks(State(state): State<Arc<AppState>>) -> Json<JwkSet> {
    Json(state.keys.jwks())
}

pub fn jwks_router() -> Router<Arc<AppState>> {
    Router::new().route("/.well-known/jwks.json", get(jwks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_json, register_customer, send, test_app};
    use auth_core::{JwksKeySet, SystemClock, TokenSettings, TokenType, TokenVerifier};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };

    #[tokio::test]
    async fn test_jwks_verifies_issued_tokens() {
        let (app, _) = test_app();
        let cookies = register_customer(&app, "a@x.com", "password1").await;

        let response = send(
            &app,
            Request::builder()
                .uri("/.well-known/jwks.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["keys"][0]["kty"], "OKP");
        assert_eq!(body["keys"][0]["alg"], "EdDSA");

        let key_set = JwksKeySet::from_json(&body.to_string()).unwrap();
        let verifier = TokenVerifier::new(
            Arc::new(key_set),
            TokenSettings::default(),
            Arc::new(SystemClock),
        );
        let access = cookies[0]
            .split(';')
            .next()
            .and_then(|kv| kv.strip_prefix("accessToken="))
            .unwrap();
        let claims = verifier.verify(access, TokenType::Access).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
    }
}
