//! Redirect constant tables and the method rewrite rule.
//!
//! The tables are plain `const` arrays: built at compile time, never
//! mutated, shared by reference across every exchange.

use crate::http::orderedheaders::OrderedHeaderMap;
use http::header::{self, HeaderName};
use http::{Method, StatusCode};
use url::Url;

/// Statuses that are followed. 308 is not part of the set.
pub const REDIRECT_STATUSES: [StatusCode; 4] = [
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
];

/// The only request headers that survive a redirect.
pub const PROPAGATED_ON_REDIRECT_HEADERS: [HeaderName; 6] = [
    header::ACCEPT,
    header::ACCEPT_CHARSET,
    header::ACCEPT_ENCODING,
    header::ACCEPT_LANGUAGE,
    header::REFERER,
    header::USER_AGENT,
];

const HTTP: &str = "http";
const WEBSOCKET: &str = "ws";

pub fn is_redirect_status(status: StatusCode) -> bool {
    REDIRECT_STATUSES.contains(&status)
}

/// Method for the next hop.
///
/// 303 always becomes GET. 302 becomes GET unless `strict_302` is set, in
/// which case it keeps the method like 301 and 307 do.
pub fn redirect_method(status: StatusCode, method: &Method, strict_302: bool) -> Method {
    if status == StatusCode::SEE_OTHER || (status == StatusCode::FOUND && !strict_302) {
        Method::GET
    } else {
        method.clone()
    }
}

/// Copy the allow-listed headers of `headers`, preserving order and every
/// value of repeated names.
pub fn propagated_headers(headers: &OrderedHeaderMap) -> OrderedHeaderMap {
    headers
        .iter()
        .filter(|(name, _)| PROPAGATED_ON_REDIRECT_HEADERS.contains(*name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Keep a WebSocket exchange on a WebSocket scheme after a redirect that
/// resolved to `http`/`https`.
pub fn carry_websocket_scheme(original: &Url, next: Url) -> Url {
    if !original.scheme().starts_with(WEBSOCKET) {
        return next;
    }
    let Some(rest) = next.as_str().strip_prefix(HTTP) else {
        return next;
    };
    match Url::parse(&format!("{WEBSOCKET}{rest}")) {
        Ok(url) => url,
        Err(_) => next,
    }
}
