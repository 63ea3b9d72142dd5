//! 설정 관리.
//!
//! 기본값 → TOML 파일(선택) → `AUTH__` 접두사 환경 변수 순서로 덮어씁니다.
//! 예: `AUTH__TOKEN__ISSUER=https://auth.example.com`

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::session::RotationPolicy;

/// 인증 서비스 전체 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub token: TokenConfig,
    pub keys: KeyConfig,
    pub password: PasswordConfig,
    pub cookie: CookieConfig,
    pub logging: LoggingConfig,
    pub refresh: RefreshConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

/// 데이터베이스 설정.
///
/// `url`이 없으면 메모리 저장소로 동작합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 30,
        }
    }
}

/// 토큰 발급 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// `iss` 클레임
    pub issuer: String,
    /// `aud` 클레임
    pub audience: String,
    /// access token 수명 (초)
    pub access_ttl_secs: i64,
    /// refresh token 및 레코드 수명 (초)
    pub refresh_ttl_secs: i64,
    /// 만료 판정 허용 오차 (초)
    pub leeway_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "auth-service".to_string(),
            audience: "auth-service".to_string(),
            access_ttl_secs: 3600,
            refresh_ttl_secs: 31_536_000,
            leeway_secs: 0,
        }
    }
}

/// 서명 키 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyConfig {
    /// PKCS#8 PEM 형식 Ed25519 개인키 경로
    pub private_key_path: Option<String>,
    /// JWT 헤더의 `kid`
    pub kid: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            private_key_path: None,
            kid: "auth-key-1".to_string(),
        }
    }
}

/// Argon2id 파라미터.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// 인증 쿠키 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    pub domain: Option<String>,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            domain: Some("localhost".to_string()),
            secure: false,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// pretty, json, compact
    pub format: String,
    /// 세션 흐름 span의 시작/종료 기록
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

/// Refresh 회전 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub rotation: RotationPolicy,
}

impl AuthConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&AuthConfig::default())?)
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("AUTH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// `config/default.toml`에서 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
