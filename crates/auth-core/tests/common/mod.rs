//! 통합 테스트 공용 구성.

#![allow(dead_code)]

use std::sync::Arc;

use auth_core::config::PasswordConfig;
use auth_core::{
    AuthorizationGate, CredentialVerifier, KeyRing, ManualClock, MemoryPrincipalStore,
    MemoryRefreshTokenStore, Registration, RotationPolicy, SessionManager, TokenIssuer,
    TokenSettings,
};
use secrecy::SecretString;

pub struct Harness {
    pub sessions: SessionManager,
    pub gate: AuthorizationGate,
    pub issuer: Arc<TokenIssuer>,
    pub principals: Arc<MemoryPrincipalStore>,
    pub refresh_tokens: Arc<MemoryRefreshTokenStore>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(rotation: RotationPolicy) -> Harness {
    let clock = Arc::new(ManualClock::starting_now());
    let ring = Arc::new(KeyRing::generate("test-key").unwrap());
    let settings = TokenSettings::default();

    let issuer = Arc::new(TokenIssuer::from_key_ring(ring, settings.clone(), clock.clone()));
    let principals = Arc::new(MemoryPrincipalStore::new());
    let refresh_tokens = Arc::new(MemoryRefreshTokenStore::new(settings.refresh_ttl, clock.clone()));
    let credentials = CredentialVerifier::new(&PasswordConfig {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();

    let sessions = SessionManager::new(
        principals.clone(),
        refresh_tokens.clone(),
        issuer.clone(),
        credentials,
    )
    .with_rotation(rotation);
    let gate = AuthorizationGate::new(issuer.verifier(), refresh_tokens.clone(), clock.clone());

    Harness {
        sessions,
        gate,
        issuer,
        principals,
        refresh_tokens,
        clock,
    }
}

pub fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

pub fn registration(email: &str, password: &str) -> Registration {
    Registration {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: secret(password),
        tenant_id: None,
    }
}
