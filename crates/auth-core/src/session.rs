//! 세션 흐름: 가입, 로그인, 토큰 갱신, 로그아웃, 본인 조회.

use std::sync::Arc;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::credential::CredentialVerifier;
use crate::domain::{
    Claims, ClaimsPayload, NewPrincipal, Principal, PrincipalId, Role, TenantId,
};
use crate::error::{AuthError, AuthResult, StoreError};
use crate::gate::RefreshContext;
use crate::store::{PrincipalStore, RefreshTokenStore};
use crate::token::{IssuedToken, TokenIssuer};

/// 동시에 같은 refresh token이 사용될 때의 처리 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// 이전 레코드를 실제로 삭제한 요청만 성공
    #[default]
    Strict,
    /// 동시 요청 모두 성공 (각자 새 레코드 보유)
    Lenient,
}

/// 가입/등록 입력.
#[derive(Debug)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
    pub tenant_id: Option<TenantId>,
}

/// 발급된 토큰 한 쌍.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub principal_id: PrincipalId,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// 세션 관리자.
#[derive(Clone)]
pub struct SessionManager {
    principals: Arc<dyn PrincipalStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    issuer: Arc<TokenIssuer>,
    credentials: CredentialVerifier,
    rotation: RotationPolicy,
}

impl SessionManager {
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        issuer: Arc<TokenIssuer>,
        credentials: CredentialVerifier,
    ) -> Self {
        Self {
            principals,
            refresh_tokens,
            issuer,
            credentials,
            rotation: RotationPolicy::default(),
        }
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    /// 자가 가입. 역할은 항상 CUSTOMER이며 곧바로 토큰을 발급합니다.
    ///
    /// 테넌트는 지정할 수 없습니다. 테넌트 배정은 [`enroll`](Self::enroll)로만 합니다.
    #[instrument(skip_all)]
    pub async fn register(&self, mut registration: Registration) -> AuthResult<SessionTokens> {
        if registration.tenant_id.take().is_some() {
            tracing::warn!("Tenant ignored on self-registration");
        }
        let principal = self.create_principal(registration, Role::Customer).await?;
        tracing::info!(principal_id = %principal.id, "Principal registered");
        self.issue_session(&principal).await
    }

    /// 관리자에 의한 주체 생성 (기본 역할: MANAGER). 토큰은 발급하지 않습니다.
    #[instrument(skip_all)]
    pub async fn enroll(&self, registration: Registration, role: Option<Role>) -> AuthResult<Principal> {
        let role = role.unwrap_or(Role::Manager);
        let principal = self.create_principal(registration, role).await?;
        tracing::info!(principal_id = %principal.id, role = %role, "Principal enrolled");
        Ok(principal)
    }

    /// 이메일/비밀번호 로그인.
    ///
    /// 계정이 없는 경우와 비밀번호가 틀린 경우를 구분하지 않습니다.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: SecretString) -> AuthResult<SessionTokens> {
        let email = email.trim();

        let credential = self
            .principals
            .find_by_email_with_credential(email)
            .await
            .map_err(storage_failure)?;

        let Some(credential) = credential else {
            self.credentials.verify_dummy_async(password).await?;
            tracing::info!("Login failed");
            return Err(AuthError::InvalidCredentials);
        };

        let matched = self
            .credentials
            .verify_async(password, credential.password_hash)
            .await?;
        if !matched {
            tracing::info!("Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(principal_id = %credential.principal.id, "Login succeeded");
        self.issue_session(&credential.principal).await
    }

    /// Refresh token 회전.
    ///
    /// 새 access token과 새 레코드/refresh token을 발급한 뒤 이전 레코드를 삭제합니다.
    /// 클레임은 저장소의 현재 주체 정보로 다시 구성됩니다.
    #[instrument(skip_all, fields(principal_id = %context.claims.subject))]
    pub async fn refresh(&self, context: &RefreshContext) -> AuthResult<SessionTokens> {
        let principal = self
            .principals
            .find_by_id(context.claims.subject)
            .await
            .map_err(storage_failure)?
            .ok_or(AuthError::PrincipalNotFound)?;

        let payload = ClaimsPayload::for_principal(&principal);
        let access = self.issuer.issue_access(&payload)?;

        let record = self
            .refresh_tokens
            .create(principal.id)
            .await
            .map_err(storage_failure)?;
        let refresh = self.issuer.issue_refresh(&payload, record.id)?;

        let consumed = self
            .refresh_tokens
            .delete_by_id(context.record.id)
            .await
            .map_err(storage_failure)?;

        if !consumed && self.rotation == RotationPolicy::Strict {
            tracing::warn!(
                record_id = %context.record.id,
                "Refresh record already consumed by a concurrent request"
            );
            if let Err(e) = self.refresh_tokens.delete_by_id(record.id).await {
                tracing::error!(error = %e, record_id = %record.id, "Failed to discard new refresh record");
            }
            return Err(AuthError::Unauthenticated);
        }

        tracing::info!(old = %context.record.id, new = %record.id, "Refresh token rotated");
        Ok(SessionTokens {
            principal_id: principal.id,
            access,
            refresh,
        })
    }

    /// 로그아웃. 레코드가 이미 없어도 성공합니다.
    #[instrument(skip_all, fields(principal_id = %claims.subject))]
    pub async fn logout(&self, claims: &Claims) -> AuthResult<()> {
        let Some(record_id) = claims.refresh_record_id else {
            return Ok(());
        };

        let removed = self
            .refresh_tokens
            .delete_by_id(record_id)
            .await
            .map_err(storage_failure)?;
        tracing::info!(record_id = %record_id, removed, "Logged out");
        Ok(())
    }

    /// 토큰 주체의 현재 공개 정보.
    pub async fn self_info(&self, claims: &Claims) -> AuthResult<Principal> {
        self.principals
            .find_by_id(claims.subject)
            .await
            .map_err(storage_failure)?
            .ok_or(AuthError::PrincipalNotFound)
    }

    async fn create_principal(&self, registration: Registration, role: Role) -> AuthResult<Principal> {
        let email = registration.email.trim().to_string();

        let existing = self
            .principals
            .find_by_email_with_credential(&email)
            .await
            .map_err(storage_failure)?;
        if existing.is_some() {
            return Err(AuthError::DuplicateCredential);
        }

        let password_hash = self.credentials.hash_async(registration.password).await?;

        self.principals
            .create(NewPrincipal {
                first_name: registration.first_name,
                last_name: registration.last_name,
                email,
                password_hash,
                role,
                tenant_id: registration.tenant_id,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AuthError::DuplicateCredential,
                other => storage_failure(other),
            })
    }

    async fn issue_session(&self, principal: &Principal) -> AuthResult<SessionTokens> {
        let payload = ClaimsPayload::for_principal(principal);
        let access = self.issuer.issue_access(&payload)?;

        let record = self
            .refresh_tokens
            .create(principal.id)
            .await
            .map_err(storage_failure)?;
        let refresh = self.issuer.issue_refresh(&payload, record.id)?;

        Ok(SessionTokens {
            principal_id: principal.id,
            access,
            refresh,
        })
    }
}

fn storage_failure(err: StoreError) -> AuthError {
    tracing::error!(error = %err, "Storage operation failed");
    AuthError::StorageFailure
}
