//! HTTP 인증 경계.
//!
//! - [`cookie`]: 토큰 쿠키 생성/해석
//! - [`middleware`]: 핸들러용 인증 추출기

pub mod cookie;
pub mod middleware;

pub use cookie::{cookie_value, CookieSettings, ACCESS_COOKIE, REFRESH_COOKIE};
pub use middleware::{
    access_token, bearer_token, refresh_token, AdminAuth, JwtAuth, RefreshAuth, RefreshClaims,
    ADMIN_ONLY,
};
