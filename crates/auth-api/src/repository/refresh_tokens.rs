//! Refresh 레코드 테이블 저장소.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use auth_core::{Clock, PrincipalId, RefreshRecord, RefreshRecordId, RefreshTokenStore, StoreError};

use super::store_error;

#[derive(Debug, sqlx::FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: i64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshRecord {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshRecord {
            id: RefreshRecordId(row.id),
            principal_id: PrincipalId(row.user_id),
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// Postgres refresh 레코드 저장소.
///
/// 만료 시각은 애플리케이션 시계 기준으로 기록합니다.
pub struct PgRefreshTokenStore {
    pool: PgPool,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl PgRefreshTokenStore {
    pub fn new(pool: PgPool, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { pool, ttl, clock }
    }

    /// 만료된 레코드 정리. 삭제된 행 수를 반환합니다.
    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(self.clock.now())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn create(&self, principal_id: PrincipalId) -> Result<RefreshRecord, StoreError> {
        let now = self.clock.now();

        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (id, user_id, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(principal_id.0)
        .bind(now)
        .bind(now + self.ttl)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.into())
    }

    async fn delete_by_id(&self, id: RefreshRecordId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: RefreshRecordId) -> Result<Option<RefreshRecord>, StoreError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT id, user_id, created_at, expires_at FROM refresh_tokens WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(RefreshRecord::from))
    }
}
