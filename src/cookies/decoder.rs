//! `Set-Cookie` decoding.

use crate::cookies::canonicalcookie::{CanonicalCookie, SameSite};
use cookie::Cookie;
use time::OffsetDateTime;

/// Decodes a single `Set-Cookie` header value.
///
/// Returns `None` for input that does not form a cookie; callers drop those
/// silently.
pub trait CookieDecoder: Send + Sync {
    fn decode(&self, header_value: &str) -> Option<CanonicalCookie>;
}

/// Decoder backed by the `cookie` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCookieDecoder;

impl CookieDecoder for DefaultCookieDecoder {
    fn decode(&self, header_value: &str) -> Option<CanonicalCookie> {
        let parsed = match Cookie::parse(header_value) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed Set-Cookie");
                return None;
            }
        };
        if parsed.name().is_empty() {
            return None;
        }

        let now = OffsetDateTime::now_utc();

        // Chromium strips the leading dot of an explicit domain.
        let domain = parsed
            .domain()
            .map(|d| d.trim_start_matches('.').to_lowercase())
            .unwrap_or_default();

        let same_site = match parsed.same_site() {
            Some(cookie::SameSite::Lax) => SameSite::Lax,
            Some(cookie::SameSite::Strict) => SameSite::Strict,
            Some(cookie::SameSite::None) => SameSite::NoRestriction,
            None => SameSite::Unspecified,
        };

        let mut c = CanonicalCookie::new(
            parsed.name().to_string(),
            parsed.value().to_string(),
            domain,
            parsed.path().unwrap_or("/").to_string(),
            now,
            parsed.expires().and_then(|e| e.datetime()),
        );
        c.max_age = parsed.max_age().map(|age| age.whole_seconds());
        c.secure = parsed.secure().unwrap_or(false);
        c.http_only = parsed.http_only().unwrap_or(false);
        c.same_site = same_site;
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple() {
        let c = DefaultCookieDecoder.decode("foo=bar").unwrap();
        assert_eq!(c.name, "foo");
        assert_eq!(c.value, "bar");
        assert_eq!(c.path, "/");
        assert!(c.host_only);
    }

    #[test]
    fn test_decode_attributes() {
        let c = DefaultCookieDecoder
            .decode(concat!(
                "sid=abc; Domain=.Example.com; Path=/app; ",
                "Secure; HttpOnly; SameSite=Lax; Max-Age=60"
            ))
            .unwrap();
        assert_eq!(c.domain, "example.com");
        assert!(!c.host_only);
        assert_eq!(c.path, "/app");
        assert!(c.secure);
        assert!(c.http_only);
        assert_eq!(c.same_site, SameSite::Lax);
        assert_eq!(c.max_age, Some(60));
    }

    #[test]
    fn test_decode_expires() {
        let c = DefaultCookieDecoder
            .decode("a=b; Expires=Wed, 21 Oct 2015 07:28:00 GMT")
            .unwrap();
        let expiry = c.expiration_time.unwrap();
        assert_eq!(expiry.year(), 2015);
        assert!(expiry < OffsetDateTime::now_utc());
    }

    #[test]
    fn test_malformed_is_none() {
        assert!(DefaultCookieDecoder.decode("").is_none());
        assert!(DefaultCookieDecoder.decode("no-equals-sign").is_none());
        assert!(DefaultCookieDecoder.decode("=value").is_none());
    }
}
