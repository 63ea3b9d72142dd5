//! 인가 게이트.
//!
//! 요청에 실린 토큰으로 주체를 확인하고, 작업이 선언한 허용 역할과 비교합니다.
//! 토큰 관련 실패는 원인과 관계없이 모두 [`AuthError::Unauthenticated`]로 수렴합니다.

use std::sync::Arc;

use crate::clock::Clock;
use crate::domain::{Claims, RefreshRecord, RoleSet, TokenType};
use crate::error::{AuthError, AuthResult};
use crate::store::RefreshTokenStore;
use crate::token::TokenVerifier;

/// 보호된 작업의 접근 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// 인증 불필요 (토큰이 유효하면 클레임 제공)
    Public,
    /// 유효한 access token 필요
    Authenticated,
    /// 유효한 access token + 허용 역할 필요
    Roles(RoleSet),
}

/// 서버 측 레코드까지 확인된 refresh token.
#[derive(Debug, Clone)]
pub struct RefreshContext {
    pub claims: Claims,
    pub record: RefreshRecord,
}

/// 인증/인가 검사기.
#[derive(Clone)]
pub struct AuthorizationGate {
    verifier: TokenVerifier,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    clock: Arc<dyn Clock>,
}

impl AuthorizationGate {
    pub fn new(
        verifier: TokenVerifier,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            refresh_tokens,
            clock,
        }
    }

    /// Access token을 검증합니다.
    pub fn authenticate(&self, token: Option<&str>) -> AuthResult<Claims> {
        let token = token.ok_or(AuthError::Unauthenticated)?;

        self.verifier
            .verify(token, TokenType::Access)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AuthError::Unauthenticated
            })
    }

    /// 클레임의 역할이 허용 집합에 속하는지 확인합니다.
    pub fn authorize(&self, claims: &Claims, allowed: RoleSet) -> AuthResult<()> {
        if claims.has_any_role(allowed) {
            Ok(())
        } else {
            tracing::debug!(
                principal_id = %claims.subject,
                role = %claims.role,
                "Role not permitted"
            );
            Err(AuthError::Forbidden)
        }
    }

    /// 정책을 적용합니다.
    ///
    /// `Public`은 실패하지 않으며, 유효한 토큰이 있을 때만 클레임을 돌려줍니다.
    pub fn enforce(&self, policy: AccessPolicy, token: Option<&str>) -> AuthResult<Option<Claims>> {
        match policy {
            AccessPolicy::Public => Ok(token.and_then(|t| self.authenticate(Some(t)).ok())),
            AccessPolicy::Authenticated => self.authenticate(token).map(Some),
            AccessPolicy::Roles(allowed) => {
                let claims = self.authenticate(token)?;
                self.authorize(&claims, allowed)?;
                Ok(Some(claims))
            }
        }
    }

    /// Refresh token의 서명과 만료만 검증합니다 (로그아웃용).
    pub fn parse_refresh(&self, token: Option<&str>) -> AuthResult<Claims> {
        let token = token.ok_or(AuthError::Unauthenticated)?;

        let claims = self
            .verifier
            .verify(token, TokenType::Refresh)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                AuthError::Unauthenticated
            })?;

        if claims.refresh_record_id.is_none() {
            tracing::debug!("Refresh token without record id");
            return Err(AuthError::Unauthenticated);
        }
        Ok(claims)
    }

    /// Refresh token을 검증하고 참조하는 레코드가 살아있는지 확인합니다.
    pub async fn authenticate_refresh(&self, token: Option<&str>) -> AuthResult<RefreshContext> {
        let claims = self.parse_refresh(token)?;
        let record_id = claims.refresh_record_id.ok_or(AuthError::Unauthenticated)?;

        let record = self
            .refresh_tokens
            .find_by_id(record_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, record_id = %record_id, "Refresh record lookup failed");
                AuthError::StorageFailure
            })?
            .ok_or_else(|| {
                tracing::debug!(record_id = %record_id, "Refresh record not found");
                AuthError::Unauthenticated
            })?;

        if record.principal_id != claims.subject {
            tracing::warn!(record_id = %record_id, "Refresh record belongs to another principal");
            return Err(AuthError::Unauthenticated);
        }
        if record.is_expired_at(self.clock.now()) {
            tracing::debug!(record_id = %record_id, "Refresh record expired");
            return Err(AuthError::Unauthenticated);
        }

        Ok(RefreshContext { claims, record })
    }
}
