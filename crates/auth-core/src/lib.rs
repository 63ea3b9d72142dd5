//! 인증 서비스 핵심 라이브러리.
//!
//! 자격 증명 수명주기 전반을 담당합니다:
//!
//! - [`credential`]: Argon2id 비밀번호 해싱/검증
//! - [`keys`]: Ed25519 서명 키, 키 회전, JWKS
//! - [`token`]: access/refresh JWT 발급과 검증
//! - [`store`]: 주체/refresh 레코드 저장소 계약과 메모리 구현
//! - [`session`]: 가입, 로그인, 갱신, 로그아웃 흐름
//! - [`gate`]: 요청 단위 인증/인가
//!
//! HTTP 전송(쿠키, 헤더)과 Postgres 저장소는 `auth-api` 크레이트에 있습니다.

pub mod clock;
pub mod config;
pub mod credential;
pub mod domain;
pub mod error;
pub mod gate;
pub mod keys;
pub mod logging;
pub mod session;
pub mod store;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthConfig;
pub use credential::CredentialVerifier;
pub use domain::*;
pub use error::{AuthError, AuthResult, KeyError, PasswordError, StoreError, TokenError};
pub use gate::{AccessPolicy, AuthorizationGate, RefreshContext};
pub use keys::{JwkSet, JwksKeySet, KeyRing, SigningKeyMaterial, SigningKeys, VerificationKeys};
pub use session::{Registration, RotationPolicy, SessionManager, SessionTokens};
pub use store::{MemoryPrincipalStore, MemoryRefreshTokenStore, PrincipalStore, RefreshTokenStore};
pub use token::{IssuedToken, TokenIssuer, TokenSettings, TokenVerifier};
