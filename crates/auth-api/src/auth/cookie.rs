//! 인증 쿠키 전송.
//!
//! 토큰은 `HttpOnly; SameSite=Strict` 쿠키로 전달합니다.
//! - `accessToken`: Max-Age 1시간
//! - `refreshToken`: Max-Age 1년

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header::COOKIE, HeaderMap};
use httpdate::fmt_http_date;

use auth_core::config::CookieConfig;
use auth_core::IssuedToken;

/// access token 쿠키 이름.
pub const ACCESS_COOKIE: &str = "accessToken";
/// refresh token 쿠키 이름.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// 쿠키 속성.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub domain: Option<String>,
    pub secure: bool,
    pub path: String,
}

impl From<&CookieConfig> for CookieSettings {
    fn from(config: &CookieConfig) -> Self {
        Self {
            domain: config.domain.clone().filter(|d| !d.is_empty()),
            secure: config.secure,
            path: "/".to_string(),
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self::from(&CookieConfig::default())
    }
}

impl CookieSettings {
    fn attributes(&self, parts: &mut Vec<String>) {
        parts.push(format!("Path={}", self.path));
        if let Some(domain) = &self.domain {
            parts.push(format!("Domain={domain}"));
        }
        if self.secure {
            parts.push("Secure".to_string());
        }
        parts.push("HttpOnly".to_string());
        parts.push("SameSite=Strict".to_string());
    }

    /// 발급된 토큰을 담는 `Set-Cookie` 값.
    pub fn set_cookie(&self, name: &str, issued: &IssuedToken) -> String {
        let mut parts = vec![format!("{name}={}", issued.token)];
        self.attributes(&mut parts);

        parts.push(format!("Max-Age={}", issued.ttl.num_seconds().max(0)));
        let expires: SystemTime = issued.expires_at.into();
        parts.push(format!("Expires={}", fmt_http_date(expires)));

        parts.join("; ")
    }

    /// 쿠키를 지우는 `Set-Cookie` 값.
    pub fn clear_cookie(&self, name: &str) -> String {
        let mut parts = vec![format!("{name}=")];
        self.attributes(&mut parts);

        parts.push("Max-Age=0".to_string());
        parts.push(format!("Expires={}", fmt_http_date(UNIX_EPOCH)));

        parts.join("; ")
    }
}

/// 요청의 `Cookie` 헤더에서 값을 찾습니다.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
