//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할과, 보호된 작업마다 선언하는 허용 역할 집합을 정의합니다.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 토큰에는 소문자 문자열(`"admin"`, `"manager"`, `"customer"`)로 기록됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자 - 테넌트 및 사용자 관리
    Admin,
    /// 매니저 - 테넌트 운영 담당
    Manager,
    /// 고객 - 자가 가입 사용자의 기본 역할
    Customer,
}

impl Role {
    /// 모든 역할 (높은 권한 순).
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Customer];

    /// 역할의 우선순위 레벨 반환 (높을수록 더 많은 권한).
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::Manager => 50,
            Role::Customer => 10,
        }
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }

    /// 저장/전송용 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Customer => "customer",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Role::Admin => 0b001,
            Role::Manager => 0b010,
            Role::Customer => 0b100,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 보호된 작업이 허용하는 역할 집합.
///
/// 빈 집합은 어떤 역할도 허용하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet {
    bits: u8,
}

impl RoleSet {
    /// 빈 집합.
    pub const EMPTY: RoleSet = RoleSet { bits: 0 };

    /// 단일 역할 집합.
    pub const fn only(role: Role) -> Self {
        Self { bits: role.bit() }
    }

    /// 역할을 추가한 새 집합 반환.
    pub const fn with(self, role: Role) -> Self {
        Self {
            bits: self.bits | role.bit(),
        }
    }

    /// 슬라이스에서 집합 생성.
    pub fn of(roles: &[Role]) -> Self {
        roles.iter().copied().collect()
    }

    /// 역할 포함 여부.
    pub fn contains(&self, role: Role) -> bool {
        self.bits & role.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// 포함된 역할 순회 (높은 권한 순).
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(RoleSet::EMPTY, RoleSet::with)
    }
}
