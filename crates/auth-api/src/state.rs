//! 모든 핸들러에서 공유되는 애플리케이션 상태.

use std::sync::Arc;

use auth_core::{
    AuthConfig, AuthorizationGate, Clock, CredentialVerifier, KeyRing, PasswordError,
    PrincipalStore, RefreshTokenStore, SessionManager, TokenIssuer, TokenSettings,
};

use crate::auth::CookieSettings;

/// 애플리케이션 공유 상태.
///
/// `Arc<AppState>`로 감싸 Axum State extractor로 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 가입/로그인/갱신/로그아웃 흐름
    pub sessions: SessionManager,

    /// 요청 단위 인증/인가
    pub gate: AuthorizationGate,

    /// 서명 키 (JWKS 공개용)
    pub keys: Arc<KeyRing>,

    /// 인증 쿠키 속성
    pub cookies: CookieSettings,

    /// 데이터베이스 연결 풀 (미설정 시 메모리 저장소)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    pub version: String,
}

impl AppState {
    /// 설정과 저장소로 상태를 구성합니다.
    pub fn build(
        config: &AuthConfig,
        keys: Arc<KeyRing>,
        principals: Arc<dyn PrincipalStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PasswordError> {
        let issuer = Arc::new(TokenIssuer::from_key_ring(
            keys.clone(),
            TokenSettings::from(&config.token),
            clock.clone(),
        ));
        let credentials = CredentialVerifier::new(&config.password)?;

        let gate = AuthorizationGate::new(issuer.verifier(), refresh_tokens.clone(), clock);
        let sessions = SessionManager::new(principals, refresh_tokens, issuer, credentials)
            .with_rotation(config.refresh.rotation);

        Ok(Self {
            sessions,
            gate,
            keys,
            cookies: CookieSettings::from(&config.cookie),
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 데이터베이스 풀 설정.
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 데이터베이스 연결 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => false,
        }
    }
}

/// 메모리 저장소와 저비용 해시 파라미터로 만든 테스트 상태.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use auth_core::config::PasswordConfig;
    use auth_core::{MemoryPrincipalStore, MemoryRefreshTokenStore, SystemClock};

    let mut config = AuthConfig::default();
    config.password = PasswordConfig {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let keys = Arc::new(KeyRing::generate("test-key").expect("test key generation"));
    let refresh_tokens = Arc::new(MemoryRefreshTokenStore::new(
        TokenSettings::from(&config.token).refresh_ttl,
        clock.clone(),
    ));

    AppState::build(
        &config,
        keys,
        Arc::new(MemoryPrincipalStore::new()),
        refresh_tokens,
        clock,
    )
    .expect("test state")
}
