//! Refresh 레코드 저장소.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::domain::{PrincipalId, RefreshRecord, RefreshRecordId};
use crate::error::StoreError;

/// Refresh 레코드 저장소 계약.
///
/// 레코드가 존재하는 동안에만 해당 refresh token이 유효합니다.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// 새 레코드 생성 (만료: 생성 시각 + refresh 수명).
    async fn create(&self, principal_id: PrincipalId) -> Result<RefreshRecord, StoreError>;

    /// 레코드 삭제. 실제로 삭제된 경우에만 `true`.
    async fn delete_by_id(&self, id: RefreshRecordId) -> Result<bool, StoreError>;

    async fn find_by_id(&self, id: RefreshRecordId) -> Result<Option<RefreshRecord>, StoreError>;
}

/// 메모리 기반 refresh 레코드 저장소.
pub struct MemoryRefreshTokenStore {
    records: RwLock<HashMap<RefreshRecordId, RefreshRecord>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MemoryRefreshTokenStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// 주체에 속한 레코드 수.
    pub async fn count_for_principal(&self, principal_id: PrincipalId) -> usize {
        self.records
            .read()
            .await
            .values()
            .filter(|r| r.principal_id == principal_id)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn create(&self, principal_id: PrincipalId) -> Result<RefreshRecord, StoreError> {
        let now = self.clock.now();
        let record = RefreshRecord {
            id: RefreshRecordId::new_v4(),
            principal_id,
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: RefreshRecordId) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: RefreshRecordId) -> Result<Option<RefreshRecord>, StoreError> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}
