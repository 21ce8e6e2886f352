//! Permissive CORS header injection for proxied responses.
//!
//! Headers are written with `insert`, so anything the upstream sent under the same name is
//! replaced rather than merged.

use crate::body::Body;
use crate::http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_MAX_AGE,
    },
    HeaderMap, HeaderValue, Response, StatusCode,
};

/// Value of `Access-Control-Allow-Methods` for the read-only proxies.
pub const GET_AND_OPTIONS: &str = "GET, OPTIONS";

/// One day, the preflight cache lifetime the badge endpoint advertises.
pub const ONE_DAY_SECS: u32 = 86_400;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsPolicy {
    allow_origin: HeaderValue,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: Option<u32>,
}

impl CorsPolicy {
    /// `*` origin and headers, `GET, OPTIONS` methods, no `Max-Age`.
    pub fn permissive() -> Self {
        Self {
            allow_origin: HeaderValue::from_static("*"),
            allow_methods: HeaderValue::from_static(GET_AND_OPTIONS),
            allow_headers: HeaderValue::from_static("*"),
            max_age: None,
        }
    }

    #[must_use]
    pub fn with_max_age(mut self, secs: u32) -> Self {
        self.max_age = Some(secs);
        self
    }

    pub fn max_age(&self) -> Option<u32> {
        self.max_age
    }

    /// Overwrite the CORS headers on `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        if let Some(secs) = self.max_age {
            headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(secs));
        }
    }

    /// `204 No Content` with an empty body and this policy's headers.
    pub fn preflight(&self) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        self.apply(response.headers_mut());
        response
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::permissive()
    }
}

/// True when any `Access-Control-*` header is present.
pub fn has_cors_headers(headers: &HeaderMap) -> bool {
    headers
        .keys()
        .any(|name| name.as_str().starts_with("access-control-"))
}
