use time::OffsetDateTime;

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    /// Domain attribute without leading dot. Empty for host-only cookies
    /// decoded without an origin.
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    pub expiration_time: Option<OffsetDateTime>,
    pub max_age: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
    pub host_only: bool,
    pub same_site: SameSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Unspecified,
    NoRestriction,
    Lax,
    Strict,
}

impl CanonicalCookie {
    pub fn new(
        name: String,
        value: String,
        domain: String,
        path: String,
        creation_time: OffsetDateTime,
        expiration_time: Option<OffsetDateTime>,
    ) -> Self {
        let host_only = domain.is_empty();
        Self {
            name,
            value,
            domain,
            path,
            creation_time,
            expiration_time,
            max_age: None,
            secure: false,
            http_only: false,
            host_only,
            same_site: SameSite::Unspecified,
        }
    }
}
