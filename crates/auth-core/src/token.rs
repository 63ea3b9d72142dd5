//! JWT 발급 및 검증.
//!
//! 모든 토큰은 EdDSA(Ed25519)로 서명되며 `typ` 클레임으로 access/refresh를 구분합니다.
//! 만료는 주입된 [`Clock`] 기준으로 판정합니다.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, encode, errors::ErrorKind, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::config::TokenConfig;
use crate::domain::{Claims, ClaimsPayload, RefreshRecordId, Role, TenantId, TokenType};
use crate::error::TokenError;
use crate::keys::{KeyRing, SigningKeys, VerificationKeys};

/// 토큰 발급 파라미터.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub leeway: Duration,
}

impl From<&TokenConfig> for TokenSettings {
    fn from(config: &TokenConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl: Duration::seconds(config.access_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_ttl_secs),
            leeway: Duration::seconds(config.leeway_secs),
        }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self::from(&TokenConfig::default())
    }
}

/// 토큰 본문 (직렬화 형식).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenClaims {
    sub: String,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tenant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_record_id: Option<String>,
    typ: TokenType,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
    jti: String,
}

impl TryFrom<TokenClaims> for Claims {
    type Error = TokenError;

    fn try_from(raw: TokenClaims) -> Result<Self, Self::Error> {
        let malformed = |what: &str| TokenError::Malformed(format!("invalid {} claim", what));

        let tenant: Option<TenantId> = raw
            .tenant
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|_| malformed("tenant"))?;
        let refresh_record_id: Option<RefreshRecordId> = raw
            .refresh_record_id
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|_| malformed("refreshRecordId"))?;

        Ok(Claims {
            subject: raw.sub.parse().map_err(|_| malformed("sub"))?,
            role: raw.role,
            tenant,
            first_name: raw.first_name,
            last_name: raw.last_name,
            email: raw.email,
            refresh_record_id,
            token_type: raw.typ,
            token_id: raw.jti,
            issued_at: DateTime::from_timestamp(raw.iat, 0).ok_or_else(|| malformed("iat"))?,
            expires_at: DateTime::from_timestamp(raw.exp, 0).ok_or_else(|| malformed("exp"))?,
        })
    }
}

/// 발급된 토큰과 의도된 만료 시각.
///
/// 전송 방식(쿠키, 헤더)은 호출자가 결정합니다.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// 발급 시점 기준 수명
    pub ttl: Duration,
}

/// 토큰 검증기.
///
/// 공개키만 필요하므로 JWKS 기반 키 집합으로도 생성할 수 있습니다.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn VerificationKeys>,
    settings: TokenSettings,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(
        keys: Arc<dyn VerificationKeys>,
        settings: TokenSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            keys,
            settings,
            clock,
        }
    }

    /// 서명, 발급자, 대상, 만료, 용도를 검증하고 클레임을 반환합니다.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|e| TokenError::Malformed(e.to_string()))?;
        if header.alg != Algorithm::EdDSA {
            return Err(TokenError::InvalidSignature);
        }

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = false;
        validation.validate_aud = false;

        let candidates = self.keys.decoding_keys(header.kid.as_deref());
        let mut last_error = TokenError::InvalidSignature;
        let mut decoded = None;

        for key in candidates {
            match decode::<TokenClaims>(token, &key, &validation) {
                Ok(data) => {
                    decoded = Some(data.claims);
                    break;
                }
                Err(e) => {
                    last_error = match e.kind() {
                        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                        _ => TokenError::Malformed(e.to_string()),
                    };
                }
            }
        }

        let raw = decoded.ok_or(last_error)?;

        if raw.iss != self.settings.issuer {
            return Err(TokenError::Malformed("issuer mismatch".to_string()));
        }
        if raw.aud != self.settings.audience {
            return Err(TokenError::Malformed("audience mismatch".to_string()));
        }
        if self.clock.now().timestamp() >= raw.exp + self.settings.leeway.num_seconds() {
            return Err(TokenError::Expired);
        }
        if raw.typ != expected {
            return Err(TokenError::Malformed(format!(
                "expected {} token, got {}",
                expected, raw.typ
            )));
        }

        Claims::try_from(raw)
    }
}

/// 토큰 발급자.
#[derive(Clone)]
pub struct TokenIssuer {
    signing: Arc<dyn SigningKeys>,
    verifier: TokenVerifier,
    settings: TokenSettings,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(
        signing: Arc<dyn SigningKeys>,
        verification: Arc<dyn VerificationKeys>,
        settings: TokenSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let verifier = TokenVerifier::new(verification, settings.clone(), Arc::clone(&clock));
        Self {
            signing,
            verifier,
            settings,
            clock,
        }
    }

    /// 하나의 [`KeyRing`]으로 서명과 검증을 모두 처리.
    pub fn from_key_ring(ring: Arc<KeyRing>, settings: TokenSettings, clock: Arc<dyn Clock>) -> Self {
        Self::new(ring.clone(), ring, settings, clock)
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    pub fn verifier(&self) -> TokenVerifier {
        self.verifier.clone()
    }

    /// Access token 발급 (수명: `access_ttl`).
    pub fn issue_access(&self, payload: &ClaimsPayload) -> Result<IssuedToken, TokenError> {
        let claims = self.build(payload, TokenType::Access, None, self.settings.access_ttl);
        self.sign(claims, self.settings.access_ttl)
    }

    /// Refresh token 발급 (수명: `refresh_ttl`). 레코드 ID를 함께 서명합니다.
    pub fn issue_refresh(
        &self,
        payload: &ClaimsPayload,
        record_id: RefreshRecordId,
    ) -> Result<IssuedToken, TokenError> {
        let claims = self.build(
            payload,
            TokenType::Refresh,
            Some(record_id),
            self.settings.refresh_ttl,
        );
        self.sign(claims, self.settings.refresh_ttl)
    }

    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        self.verifier.verify(token, expected)
    }

    fn build(
        &self,
        payload: &ClaimsPayload,
        typ: TokenType,
        record_id: Option<RefreshRecordId>,
        ttl: Duration,
    ) -> TokenClaims {
        let now = self.clock.now();
        // refresh token에는 프로필 정보를 싣지 않음
        let with_profile = typ == TokenType::Access;

        TokenClaims {
            sub: payload.subject.to_string(),
            role: payload.role,
            tenant: payload.tenant.map(|t| t.to_string()),
            first_name: payload.first_name.clone().filter(|_| with_profile),
            last_name: payload.last_name.clone().filter(|_| with_profile),
            email: payload.email.clone().filter(|_| with_profile),
            refresh_record_id: record_id.map(|id| id.to_string()),
            typ,
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    fn sign(&self, claims: TokenClaims, ttl: Duration) -> Result<IssuedToken, TokenError> {
        let key = self
            .signing
            .active_signing_key()
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(key.kid().to_string());

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| TokenError::Encoding("expiry out of range".to_string()))?;
        let token = encode(&header, &claims, key.encoding_key())
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at,
            ttl,
        })
    }
}
