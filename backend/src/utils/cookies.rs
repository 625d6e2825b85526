//! Refresh-cookie plumbing.
//!
//! The refresh token travels exclusively in an HTTP-only cookie; these
//! helpers build the `Set-Cookie` directives and read the cookie back off
//! incoming requests.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};

/// Name of the cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// A pending `Set-Cookie` for the refresh token, produced by the session
/// lifecycle and rendered by the transport layer.
#[derive(Debug, Clone)]
pub struct RefreshCookie {
    pub token: String,
    /// Cookie lifetime in seconds; matches the refresh token's TTL.
    pub max_age: u64,
}

impl RefreshCookie {
    /// Renders the directive as a `Set-Cookie` header value.
    pub fn header_value(&self, config: &Config) -> ServiceResult<HeaderValue> {
        build_cookie(&self.token, self.max_age, config)
    }
}

/// A directive that removes the refresh cookie (logout).
pub fn clear_cookie(config: &Config) -> ServiceResult<HeaderValue> {
    build_cookie("", 0, config)
}

fn build_cookie(value: &str, max_age: u64, config: &Config) -> ServiceResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        REFRESH_COOKIE, value, max_age
    );
    if let Some(domain) = &config.cookie_domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|error| ServiceError::internal_error(format!("Invalid cookie value: {}", error)))
}

/// Extracts a cookie value by name from the request headers.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(|part| part.trim())
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(domain: Option<&str>, secure: bool) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            server_port: 0,
            jwt_secret: "unit-test-secret".to_string(),
            access_token_ttl_seconds: 900,
            refresh_token_ttl_seconds: 86400,
            refresh_token_ttl_long_seconds: 2592000,
            cookie_domain: domain.map(|d| d.to_string()),
            cookie_secure: secure,
            admin_login: None,
            admin_password: None,
        }
    }

    #[test]
    fn test_refresh_cookie_format() {
        let directive = RefreshCookie {
            token: "tok123".to_string(),
            max_age: 86400,
        };
        let value = directive
            .header_value(&test_config(Some("crm.example.com"), true))
            .unwrap();
        let rendered = value.to_str().unwrap();

        assert!(rendered.starts_with("refreshToken=tok123; "));
        assert!(rendered.contains("Max-Age=86400"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Domain=crm.example.com"));
        assert!(rendered.contains("Secure"));
    }

    #[test]
    fn test_local_dev_cookie_omits_domain_and_secure() {
        let directive = RefreshCookie {
            token: "tok".to_string(),
            max_age: 60,
        };
        let value = directive.header_value(&test_config(None, false)).unwrap();
        let rendered = value.to_str().unwrap();

        assert!(!rendered.contains("Domain="));
        assert!(!rendered.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let value = clear_cookie(&test_config(None, false)).unwrap();
        let rendered = value.to_str().unwrap();

        assert!(rendered.starts_with("refreshToken=;"));
        assert!(rendered.contains("Max-Age=0"));
    }

    #[test]
    fn test_parse_cookie_picks_the_right_pair() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; refreshToken=abc.def.ghi; lang=en"),
        );

        assert_eq!(
            parse_cookie(&headers, REFRESH_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(parse_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_parse_cookie_without_header() {
        assert_eq!(parse_cookie(&HeaderMap::new(), REFRESH_COOKIE), None);
    }
}
