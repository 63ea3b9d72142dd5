//! Postgres 저장소 구현.
//!
//! `auth-core`의 저장소 계약을 sqlx로 구현합니다.

pub mod refresh_tokens;
pub mod users;

pub use refresh_tokens::PgRefreshTokenStore;
pub use users::{PgPrincipalStore, UserRow};

use auth_core::StoreError;

/// sqlx 오류를 저장소 오류로 변환.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().unwrap_or_default();
            if code == "23505" {
                // PostgreSQL 고유 제약 조건 위반
                StoreError::Duplicate(db_err.message().to_string())
            } else {
                StoreError::Backend(db_err.message().to_string())
            }
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
