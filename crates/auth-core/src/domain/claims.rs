//! 토큰에 담기는 클레임.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Principal, PrincipalId, RefreshRecordId, Role, RoleSet, TenantId};

/// 토큰 용도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// 1시간 유효한 access token
    Access,
    /// 1년 유효한 refresh token
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// 요청마다 구성되는 클레임 페이로드.
///
/// 독립 엔티티로 저장되지 않고 서명된 토큰 안에만 존재합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsPayload {
    pub subject: PrincipalId,
    pub role: Role,
    pub tenant: Option<TenantId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl ClaimsPayload {
    /// 주체의 현재 속성으로 페이로드 생성.
    pub fn for_principal(principal: &Principal) -> Self {
        Self {
            subject: principal.id,
            role: principal.role,
            tenant: principal.tenant_id,
            first_name: Some(principal.first_name.clone()),
            last_name: Some(principal.last_name.clone()),
            email: Some(principal.email.clone()),
        }
    }
}

/// 서명/만료 검증을 통과한 토큰의 클레임.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub subject: PrincipalId,
    pub role: Role,
    pub tenant: Option<TenantId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// refresh token에만 존재
    pub refresh_record_id: Option<RefreshRecordId>,
    pub token_type: TokenType,
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// 허용 역할 집합에 속하는지 확인.
    pub fn has_any_role(&self, required: RoleSet) -> bool {
        required.contains(self.role)
    }

    /// 클레임에서 페이로드만 추출.
    pub fn payload(&self) -> ClaimsPayload {
        ClaimsPayload {
            subject: self.subject,
            role: self.role,
            tenant: self.tenant,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}
