//! 인증 API 서버.
//!
//! 가입, 로그인, 토큰 갱신, 로그아웃, JWKS 엔드포인트를 제공합니다.
//!
//! `--generate-key` 플래그로 실행하면 PKCS#8 PEM Ed25519 개인키를 출력하고 종료합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use auth_api::repository::{PgPrincipalStore, PgRefreshTokenStore};
use auth_api::routes::create_api_router;
use auth_api::state::AppState;
use auth_core::logging::{init_logging, LogConfig};
use auth_core::{
    AuthConfig, Clock, KeyRing, MemoryPrincipalStore, MemoryRefreshTokenStore, PrincipalStore,
    RefreshTokenStore, SigningKeyMaterial, SystemClock, TokenSettings,
};

/// 만료된 refresh 레코드 정리 주기.
const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    if std::env::args().any(|arg| arg == "--generate-key") {
        print!("{}", SigningKeyMaterial::generate_pkcs8_pem()?);
        return Ok(());
    }

    let config = AuthConfig::load_default()?;
    init_logging(LogConfig::from_settings(&config.logging)).map_err(|e| anyhow::anyhow!(e))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting auth API server");

    let keys = Arc::new(load_keys(&config)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let refresh_ttl = TokenSettings::from(&config.token).refresh_ttl;

    let state = match &config.database.url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
                .connect(database_url)
                .await?;
            info!("Connected to database");

            sqlx::migrate!("../../migrations").run(&pool).await?;
            info!("Database migrations applied");

            let refresh_tokens = Arc::new(PgRefreshTokenStore::new(
                pool.clone(),
                refresh_ttl,
                clock.clone(),
            ));
            spawn_refresh_purge(refresh_tokens.clone());

            let principals: Arc<dyn PrincipalStore> = Arc::new(PgPrincipalStore::new(pool.clone()));
            let refresh_tokens: Arc<dyn RefreshTokenStore> = refresh_tokens;

            AppState::build(&config, keys, principals, refresh_tokens, clock)?.with_db_pool(pool)
        }
        None => {
            warn!("AUTH__DATABASE__URL not set, using in-memory stores (data is lost on restart)");
            AppState::build(
                &config,
                keys,
                Arc::new(MemoryPrincipalStore::new()),
                Arc::new(MemoryRefreshTokenStore::new(refresh_ttl, clock.clone())),
                clock,
            )?
        }
    };

    let app = create_router(Arc::new(state), config.server.request_timeout_secs);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// 서명 키 로드.
///
/// 키 파일이 없으면 임시 키를 생성합니다. 재시작 시 기존 토큰이 모두 무효화됩니다.
fn load_keys(config: &AuthConfig) -> anyhow::Result<KeyRing> {
    match &config.keys.private_key_path {
        Some(path) => {
            let pem = std::fs::read_to_string(path)?;
            let ring = KeyRing::from_pkcs8_pem(config.keys.kid.clone(), &pem)?;
            info!(kid = %config.keys.kid, "Loaded signing key from {}", path);
            Ok(ring)
        }
        None => {
            warn!(
                kid = %config.keys.kid,
                "AUTH__KEYS__PRIVATE_KEY_PATH not set, generating ephemeral signing key"
            );
            Ok(KeyRing::generate(config.keys.kid.clone())?)
        }
    }
}

/// 만료 refresh 레코드 주기적 정리.
fn spawn_refresh_purge(store: Arc<PgRefreshTokenStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(n) => info!(purged = n, "Expired refresh records removed"),
                Err(e) => warn!(error = %e, "Failed to purge expired refresh records"),
            }
        }
    });
}

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS` 환경변수에 쉼표로 구분된 origin 목록을 지정합니다.
/// 쿠키 인증에는 자격 증명 허용이 필요하므로 명시적 origin이 있을 때만 켭니다.
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        warn!("CORS_ORIGINS not set, allowing any origin without credentials (development mode)");
        layer.allow_origin(AllowOrigin::any())
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>, request_timeout_secs: u64) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(request_timeout_secs),
        ))
        .layer(cors_layer())
}

/// Ctrl+C 또는 SIGTERM 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
