//! 사용자 테이블 저장소.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use auth_core::{
    NewPrincipal, Principal, PrincipalCredential, PrincipalId, PrincipalStore, Role, StoreError,
    TenantId,
};

use super::store_error;

/// `users` 테이블 행.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub tenant_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    fn principal(&self) -> Result<Principal, StoreError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| StoreError::Backend(format!("Unknown role in users table: {}", self.role)))?;

        Ok(Principal {
            id: PrincipalId(self.id),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role,
            tenant_id: self.tenant_id.map(TenantId),
        })
    }
}

impl TryFrom<UserRow> for PrincipalCredential {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let principal = row.principal()?;
        Ok(PrincipalCredential {
            principal,
            password_hash: row.password_hash,
        })
    }
}

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, role, tenant_id, created_at";

/// Postgres 주체 저장소.
#[derive(Clone)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_by_email_with_credential(
        &self,
        email: &str,
    ) -> Result<Option<PrincipalCredential>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.map(PrincipalCredential::try_from).transpose()
    }

    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        row.as_ref().map(UserRow::principal).transpose()
    }

    async fn create(&self, new: NewPrincipal) -> Result<Principal, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, role, tenant_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .bind(new.tenant_id.map(|t| t.0))
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        row.principal()
    }
}
