//! 인증 도메인 모델.

mod claims;
mod principal;
mod role;

pub use claims::{Claims, ClaimsPayload, TokenType};
pub use principal::{
    NewPrincipal, Principal, PrincipalCredential, PrincipalId, RefreshRecord, RefreshRecordId,
    TenantId,
};
pub use role::{Role, RoleSet};
