//! Session transport: set/get/clear the httpOnly session cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use carebase_core::auth::jwt::SESSION_TOKEN_EXPIRY_SECS;
use time::{Duration, OffsetDateTime};

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "auth_token";

/// Binds session tokens to the `auth_token` cookie.
#[derive(Clone, Copy, Debug)]
pub struct SessionTransport {
    secure: bool,
}

impl SessionTransport {
    /// `secure` sets the cookie's `Secure` attribute (production only).
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// httpOnly, SameSite=Strict cookie living as long as the token.
    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        let lifetime = Duration::seconds(SESSION_TOKEN_EXPIRY_SECS);
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(lifetime)
            .expires(OffsetDateTime::now_utc() + lifetime)
            .build()
    }

    /// Same attributes as the session cookie, already expired.
    pub fn expired_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, String::new()))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
    }

    pub fn attach(&self, jar: CookieJar, token: &str) -> CookieJar {
        jar.add(self.session_cookie(token))
    }

    /// Token carried by the request, if any. An empty cookie counts as absent.
    pub fn extract(&self, jar: &CookieJar) -> Option<String> {
        jar.get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Overwrite the cookie with an expired one. Safe to call when no cookie exists.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.expired_cookie())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

    use super::*;

    #[test]
    fn session_cookie_flags() {
        let cookie = SessionTransport::new(false).session_cookie("tok").to_string();
        assert!(cookie.starts_with("auth_token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn secure_flag_in_production() {
        let cookie = SessionTransport::new(true).session_cookie("tok").to_string();
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn extract_reads_request_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("other=1; auth_token=abc"));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(SessionTransport::new(false).extract(&jar), Some("abc".into()));
    }

    #[test]
    fn extract_treats_missing_and_empty_as_absent() {
        let transport = SessionTransport::new(false);
        assert!(transport.extract(&CookieJar::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token="));
        assert!(transport.extract(&CookieJar::from_headers(&headers)).is_none());
    }

    #[test]
    fn clear_is_idempotent_and_leaves_no_token() {
        let transport = SessionTransport::new(false);
        let jar = transport.attach(CookieJar::new(), "tok");
        let jar = transport.clear(jar);
        let jar = transport.clear(jar);
        assert!(transport.extract(&jar).is_none());

        let cleared = transport.expired_cookie().to_string();
        assert!(cleared.contains("Max-Age=0"));
        assert!(cleared.contains("HttpOnly"));
        assert!(cleared.contains("SameSite=Strict"));
    }
}
