//! Cookies carried across redirects.
//!
//! | Chromium (C++) | netexchange (Rust) | Responsibility |
//! |----------------|--------------------|----------------|
//! | `net::CanonicalCookie` | [`CanonicalCookie`] | Cookie value |
//! | `net::ParsedCookie` | [`CookieDecoder`] | `Set-Cookie` decoding |

pub mod canonicalcookie;
pub mod decoder;

pub use canonicalcookie::CanonicalCookie;
pub use decoder::{CookieDecoder, DefaultCookieDecoder};
