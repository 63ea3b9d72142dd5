//! 저장소 계약과 메모리 구현.
//!
//! 운영 환경의 Postgres 구현은 `auth-api`의 repository 모듈에 있습니다.

mod principal;
mod refresh;

pub use principal::{MemoryPrincipalStore, PrincipalStore};
pub use refresh::{MemoryRefreshTokenStore, RefreshTokenStore};
