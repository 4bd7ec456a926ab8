//! Session cookie
//!
//! The session token travels in an HTTP-only `accesstoken` cookie. The
//! header is built by hand since the attributes needed are few.

use std::str::FromStr;

use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Cookie name carrying the session token
pub const SESSION_COOKIE: &str = "accesstoken";

/// `SameSite` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("Invalid SameSite value: {}", other)),
        }
    }
}

/// Cookie attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieConfig {
    pub same_site: SameSite,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            same_site: SameSite::Lax,
            secure: false,
        }
    }
}

impl CookieConfig {
    /// Resolve from `COOKIE_SAME_SITE` / `COOKIE_SECURE` values
    ///
    /// `SameSite=None` implies `Secure` unless `COOKIE_SECURE=false`
    /// is given explicitly.
    pub fn resolve(same_site: Option<&str>, secure: Option<&str>) -> Self {
        let same_site = same_site
            .and_then(|s| s.parse::<SameSite>().ok())
            .unwrap_or_default();
        let secure = match secure.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "true" => true,
            Some(s) if s == "false" => false,
            _ => same_site == SameSite::None,
        };
        Self { same_site, secure }
    }

    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var("COOKIE_SAME_SITE").ok().as_deref(),
            std::env::var("COOKIE_SECURE").ok().as_deref(),
        )
    }

    /// `Set-Cookie` value carrying a fresh session token
    pub fn session_cookie(&self, token: &str, max_age_secs: i64) -> String {
        self.build(token, max_age_secs)
    }

    /// `Set-Cookie` value clearing the session
    pub fn clear_cookie(&self) -> String {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite={}",
            SESSION_COOKIE,
            value,
            max_age_secs.max(0),
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Read the session token from the `Cookie` headers
pub fn token_from_cookies(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = CookieConfig::default().session_cookie("abc", 86400);
        assert_eq!(
            cookie,
            "accesstoken=abc; HttpOnly; Path=/; Max-Age=86400; SameSite=Lax"
        );
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = CookieConfig::default().clear_cookie();
        assert!(cookie.starts_with("accesstoken=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_same_site_none_implies_secure() {
        let config = CookieConfig::resolve(Some("none"), None);
        assert_eq!(config.same_site, SameSite::None);
        assert!(config.secure);
        assert!(config.session_cookie("t", 1).ends_with("; Secure"));

        let config = CookieConfig::resolve(Some("none"), Some("false"));
        assert!(!config.secure);
    }

    #[test]
    fn test_explicit_secure() {
        let config = CookieConfig::resolve(Some("strict"), Some("TRUE"));
        assert_eq!(config.same_site, SameSite::Strict);
        assert!(config.secure);
    }

    #[test]
    fn test_unknown_same_site_falls_back_to_lax() {
        let config = CookieConfig::resolve(Some("sideways"), None);
        assert_eq!(config, CookieConfig::default());
    }

    #[test]
    fn test_token_from_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            HeaderValue::from_static("theme=dark; accesstoken=tok123; lang=ko"),
        );
        assert_eq!(token_from_cookies(&headers), Some("tok123"));
    }

    #[test]
    fn test_empty_or_missing_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_cookies(&headers), None);

        headers.insert(http::header::COOKIE, HeaderValue::from_static("accesstoken="));
        assert_eq!(token_from_cookies(&headers), None);
    }
}
