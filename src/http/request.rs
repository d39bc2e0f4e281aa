//! Immutable request value and its builder.
//!
//! A [`Request`] never changes once built. Redirects and filter replays
//! derive a new one through [`RequestBuilder::from_request`].

use crate::base::neterror::NetError;
use crate::cookies::canonicalcookie::CanonicalCookie;
use crate::http::orderedheaders::OrderedHeaderMap;
use bytes::Bytes;
use http::Method;
use url::Url;

/// An outgoing HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: OrderedHeaderMap,
    cookies: Vec<CanonicalCookie>,
    body: Option<Bytes>,
    follow_redirect: Option<bool>,
}

impl Request {
    /// Start building a request for `url`.
    pub fn builder(method: Method, url: &str) -> Result<RequestBuilder, NetError> {
        let url = Url::parse(url).map_err(|_| NetError::InvalidUrl)?;
        Ok(RequestBuilder::new(method, url))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &OrderedHeaderMap {
        &self.headers
    }

    pub fn cookies(&self) -> &[CanonicalCookie] {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&CanonicalCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Per-request redirect setting. `None` defers to the client configuration.
    pub fn follow_redirect(&self) -> Option<bool> {
        self.follow_redirect
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: OrderedHeaderMap,
    cookies: Vec<CanonicalCookie>,
    body: Option<Bytes>,
    follow_redirect: Option<bool>,
}

impl RequestBuilder {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: OrderedHeaderMap::new(),
            cookies: Vec::new(),
            body: None,
            follow_redirect: None,
        }
    }

    /// Start from a copy of an existing request.
    pub fn from_request(request: &Request) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
            cookies: request.cookies.clone(),
            body: request.body.clone(),
            follow_redirect: request.follow_redirect,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.headers.append(name, value).is_err() {
            tracing::debug!(header = %name, "ignoring invalid request header");
        }
        self
    }

    /// Replace every header with `headers`.
    pub fn headers(mut self, headers: OrderedHeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add `cookie`, replacing any cookie with the same name.
    pub fn add_or_replace_cookie(mut self, cookie: CanonicalCookie) -> Self {
        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
        self
    }

    pub fn body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn clear_body(mut self) -> Self {
        self.body = None;
        self
    }

    pub fn follow_redirect(mut self, follow: bool) -> Self {
        self.follow_redirect = Some(follow);
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            cookies: self.cookies,
            body: self.body,
            follow_redirect: self.follow_redirect,
        }
    }
}
