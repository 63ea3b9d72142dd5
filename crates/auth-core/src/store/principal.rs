//! 인증 주체 저장소.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{NewPrincipal, Principal, PrincipalCredential, PrincipalId};
use crate::error::StoreError;

/// 주체 조회/생성 계약.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// 이메일로 주체와 비밀번호 해시 조회 (정확히 일치).
    async fn find_by_email_with_credential(
        &self,
        email: &str,
    ) -> Result<Option<PrincipalCredential>, StoreError>;

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError>;

    /// 주체 생성. 이메일이 이미 있으면 [`StoreError::Duplicate`].
    async fn create(&self, new: NewPrincipal) -> Result<Principal, StoreError>;
}

#[derive(Default)]
struct MemoryPrincipals {
    next_id: i64,
    rows: BTreeMap<PrincipalId, PrincipalCredential>,
}

/// 메모리 기반 주체 저장소.
#[derive(Default)]
pub struct MemoryPrincipalStore {
    inner: RwLock<MemoryPrincipals>,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 주체 삭제 (테스트에서 삭제된 계정 재현용).
    pub async fn remove(&self, id: PrincipalId) -> bool {
        self.inner.write().await.rows.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.rows.is_empty()
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn find_by_email_with_credential(
        &self,
        email: &str,
    ) -> Result<Option<PrincipalCredential>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .find(|c| c.principal.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.rows.get(&id).map(|c| c.principal.clone()))
    }

    async fn create(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.rows.values().any(|c| c.principal.email == new.email) {
            return Err(StoreError::Duplicate(format!("email {}", new.email)));
        }

        inner.next_id += 1;
        let principal = Principal {
            id: PrincipalId(inner.next_id),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            role: new.role,
            tenant_id: new.tenant_id,
        };

        inner.rows.insert(
            principal.id,
            PrincipalCredential {
                principal: principal.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(principal)
    }
}
