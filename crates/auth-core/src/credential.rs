//! 비밀번호 해싱 및 검증.
//!
//! Argon2id(v0x13)로 솔트가 포함된 PHC 문자열을 만들고 검증합니다.
//! 해싱은 CPU 집약 작업이므로 비동기 경로는 `spawn_blocking`에서 실행됩니다.

use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use secrecy::{ExposeSecret, SecretString};

use crate::config::PasswordConfig;
use crate::error::PasswordError;

/// 비밀번호 검증기.
#[derive(Clone)]
pub struct CredentialVerifier {
    params: Params,
    /// 존재하지 않는 계정 로그인 시 비교용 해시
    dummy_hash: Arc<OnceLock<String>>,
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl CredentialVerifier {
    /// 설정된 Argon2 파라미터로 생성.
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(Self {
            params,
            dummy_hash: Arc::new(OnceLock::new()),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// 평문 비밀번호를 해싱합니다.
    ///
    /// 호출마다 새 솔트를 사용하므로 같은 입력이라도 결과가 다릅니다.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// 저장된 해시와 비교합니다.
    ///
    /// 해시 형식이 잘못된 경우에도 `false`를 반환합니다.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };

        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// 존재하지 않는 계정에 대해 실제 검증과 같은 비용을 소모합니다.
    ///
    /// 항상 `false`.
    pub fn verify_dummy(&self, plaintext: &str) -> bool {
        let dummy = self.dummy_hash.get_or_init(|| {
            self.hash("dummy-password-for-timing")
                .unwrap_or_default()
        });
        let _ = self.verify(plaintext, dummy);
        false
    }

    /// [`hash`](Self::hash)를 블로킹 스레드에서 실행.
    pub async fn hash_async(&self, plaintext: SecretString) -> Result<String, PasswordError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.hash(plaintext.expose_secret()))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
    }

    /// [`verify`](Self::verify)를 블로킹 스레드에서 실행.
    pub async fn verify_async(
        &self,
        plaintext: SecretString,
        hash: String,
    ) -> Result<bool, PasswordError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.verify(plaintext.expose_secret(), &hash))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))
    }

    /// [`verify_dummy`](Self::verify_dummy)를 블로킹 스레드에서 실행.
    pub async fn verify_dummy_async(&self, plaintext: SecretString) -> Result<bool, PasswordError> {
        let verifier = self.clone();
        tokio::task::spawn_blocking(move || verifier.verify_dummy(plaintext.expose_secret()))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) fn fast_password_config() -> PasswordConfig {
    PasswordConfig {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn verifier() -> CredentialVerifier {
        CredentialVerifier::new(&fast_password_config()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let verifier = verifier();
        let hash = verifier.hash("password1").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert_ne!(hash, "password1");
        assert!(verifier.verify("password1", &hash));
        assert!(!verifier.verify("password2", &hash));
    }

    #[test]
    fn test_same_password_different_salts() {
        let verifier = verifier();
        let first = verifier.hash("password1").unwrap();
        let second = verifier.hash("password1").unwrap();

        assert_ne!(first, second);
        assert!(verifier.verify("password1", &first));
        assert!(verifier.verify("password1", &second));
    }

    #[test]
    fn test_malformed_hash_is_false() {
        let verifier = verifier();
        assert!(!verifier.verify("password1", "not-a-phc-string"));
        assert!(!verifier.verify("password1", ""));
    }

    #[test]
    fn test_verify_dummy_never_matches() {
        let verifier = verifier();
        assert!(!verifier.verify_dummy("dummy-password-for-timing"));
        assert!(!verifier.verify_dummy("anything"));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let config = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(CredentialVerifier::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_async_paths() {
        let verifier = verifier();
        let hash = verifier
            .hash_async(SecretString::from("한글비밀번호123".to_string()))
            .await
            .unwrap();

        let ok = verifier
            .verify_async(SecretString::from("한글비밀번호123".to_string()), hash.clone())
            .await
            .unwrap();
        let wrong = verifier
            .verify_async(SecretString::from("다른비밀번호".to_string()), hash)
            .await
            .unwrap();

        assert!(ok);
        assert!(!wrong);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_only_hashed_plaintext_verifies(
            plaintext in "[a-zA-Z0-9]{1,24}",
            other in "[a-zA-Z0-9]{1,24}",
        ) {
            let verifier = verifier();
            let hash = verifier.hash(&plaintext).unwrap();
            prop_assert!(verifier.verify(&plaintext, &hash));
            prop_assert_eq!(verifier.verify(&other, &hash), other == plaintext);
        }
    }
}
