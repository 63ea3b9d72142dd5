//! 인증 에러 타입.
//!
//! 내부 에러(`TokenError`, `PasswordError`, `StoreError`, `KeyError`)는
//! 세션 관리자와 게이트에서 [`AuthError`]로 변환된 뒤에만 외부로 나갑니다.

use thiserror::Error;

/// 외부로 노출되는 인증 실패 분류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// 이메일 미존재 또는 비밀번호 불일치 (두 경우를 구분하지 않음)
    #[error("Email or password not match")]
    InvalidCredentials,

    /// 이미 등록된 이메일
    #[error("Email already registered")]
    DuplicateCredential,

    /// 토큰 없음, 서명 불일치, 만료, refresh 레코드 없음
    #[error("Authentication required")]
    Unauthenticated,

    /// 역할 부족
    #[error("Insufficient role")]
    Forbidden,

    /// 토큰 주체가 더 이상 존재하지 않음
    #[error("Principal not found")]
    PrincipalNotFound,

    /// 저장소 장애
    #[error("Storage failure")]
    StorageFailure,

    /// 키/해시 인프라 장애
    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// 응답 본문에 쓰는 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::DuplicateCredential => "DUPLICATE_CREDENTIAL",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::PrincipalNotFound => "PRINCIPAL_NOT_FOUND",
            AuthError::StorageFailure => "STORAGE_FAILURE",
            AuthError::Internal => "INTERNAL_ERROR",
        }
    }
}

/// 인증 작업 결과.
pub type AuthResult<T> = Result<T, AuthError>;

/// 토큰 검증/발급 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("서명 검증 실패")]
    InvalidSignature,

    #[error("토큰 만료")]
    Expired,

    #[error("잘못된 토큰: {0}")]
    Malformed(String),

    #[error("토큰 서명 실패: {0}")]
    Encoding(String),
}

/// 비밀번호 해시 인프라 에러.
///
/// 검증 불일치는 에러가 아니라 `false`입니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    #[error("해시 생성 실패: {0}")]
    HashingFailed(String),

    #[error("해시 작업 실행 실패: {0}")]
    TaskFailed(String),
}

/// 저장소 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 유일성 제약 위반
    #[error("중복 레코드: {0}")]
    Duplicate(String),

    #[error("저장소 에러: {0}")]
    Backend(String),
}

/// 키 자료 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("잘못된 키: {0}")]
    InvalidKey(String),

    #[error("활성 서명 키 없음")]
    NoActiveKey,

    #[error("JWKS 파싱 실패: {0}")]
    Jwks(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(_) => AuthError::Internal,
            _ => AuthError::Unauthenticated,
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(_: PasswordError) -> Self {
        AuthError::Internal
    }
}

impl From<KeyError> for AuthError {
    fn from(_: KeyError) -> Self {
        AuthError::Internal
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AuthError::DuplicateCredential,
            StoreError::Backend(_) => AuthError::StorageFailure,
        }
    }
}
