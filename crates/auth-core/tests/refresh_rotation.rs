//! Refresh token 회전 통합 테스트

mod common;

use auth_core::{AuthError, PrincipalId, RotationPolicy, TokenType};
use common::{harness, registration};
use tokio::task::JoinSet;

#[tokio::test]
async fn test_refresh_rotates_record() {
    let h = harness(RotationPolicy::Strict);
    let first = h
        .sessions
        .register(registration("a@x.com", "password1"))
        .await
        .unwrap();

    let context = h
        .gate
        .authenticate_refresh(Some(&first.refresh.token))
        .await
        .unwrap();
    let second = h.sessions.refresh(&context).await.unwrap();

    assert_ne!(second.refresh.token, first.refresh.token);
    assert_eq!(h.refresh_tokens.count_for_principal(PrincipalId(1)).await, 1);

    // 이전 토큰은 재사용 불가
    assert_eq!(
        h.gate
            .authenticate_refresh(Some(&first.refresh.token))
            .await
            .unwrap_err(),
        AuthError::Unauthenticated
    );
    assert!(h
        .gate
        .authenticate_refresh(Some(&second.refresh.token))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_refresh_reflects_current_principal() {
    let h = harness(RotationPolicy::Strict);
    let first = h
        .sessions
        .register(registration("a@x.com", "password1"))
        .await
        .unwrap();
    let context = h
        .gate
        .authenticate_refresh(Some(&first.refresh.token))
        .await
        .unwrap();

    let rotated = h.sessions.refresh(&context).await.unwrap();
    let claims = h
        .issuer
        .verify(&rotated.access.token, TokenType::Access)
        .unwrap();
    assert_eq!(claims.first_name.as_deref(), Some("Ada"));

    h.principals.remove(PrincipalId(1)).await;
    let context = h
        .gate
        .authenticate_refresh(Some(&rotated.refresh.token))
        .await
        .unwrap();
    assert_eq!(
        h.sessions.refresh(&context).await.unwrap_err(),
        AuthError::PrincipalNotFound
    );
}

#[tokio::test]
async fn test_logout_then_refresh_fails() {
    let h = harness(RotationPolicy::Strict);
    let tokens = h
        .sessions
        .register(registration("a@x.com", "password1"))
        .await
        .unwrap();

    let context = h
        .gate
        .authenticate_refresh(Some(&tokens.refresh.token))
        .await
        .unwrap();
    let claims = h.gate.parse_refresh(Some(&tokens.refresh.token)).unwrap();
    h.sessions.logout(&claims).await.unwrap();

    // 로그아웃 전에 검증된 컨텍스트로도 회전 불가
    assert_eq!(
        h.sessions.refresh(&context).await.unwrap_err(),
        AuthError::Unauthenticated
    );
    assert_eq!(h.refresh_tokens.count_for_principal(PrincipalId(1)).await, 0);
}

async fn race(policy: RotationPolicy, racers: usize) -> (usize, usize) {
    let h = harness(policy);
    let tokens = h
        .sessions
        .register(registration("a@x.com", "password1"))
        .await
        .unwrap();

    // 모든 요청이 같은 레코드를 확인한 상태에서 동시에 회전
    let mut contexts = Vec::new();
    for _ in 0..racers {
        contexts.push(
            h.gate
                .authenticate_refresh(Some(&tokens.refresh.token))
                .await
                .unwrap(),
        );
    }

    let mut set = JoinSet::new();
    for context in contexts {
        let sessions = h.sessions.clone();
        set.spawn(async move { sessions.refresh(&context).await });
    }

    let mut winners = 0;
    while let Some(result) = set.join_next().await {
        match result.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e, AuthError::Unauthenticated),
        }
    }

    let remaining = h.refresh_tokens.count_for_principal(PrincipalId(1)).await;
    (winners, remaining)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_strict_refresh_has_single_winner() {
    let (winners, remaining) = race(RotationPolicy::Strict, 8).await;
    assert_eq!(winners, 1);
    assert_eq!(remaining, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lenient_refresh_all_succeed() {
    let (winners, remaining) = race(RotationPolicy::Lenient, 4).await;
    assert_eq!(winners, 4);
    assert_eq!(remaining, 4);
}
