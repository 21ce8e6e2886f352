use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::body::Body;
use crate::error::EdgeError;
use crate::http::{HeaderMap, Method, Response, StatusCode, Uri};

/// Outbound request sent to an upstream origin.
pub struct ProxyRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
}

impl ProxyRequest {
    /// Bare request: no headers and an empty body, exactly what the site proxies send upstream.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn into_parts(self) -> (Method, Uri, HeaderMap, Body) {
        (self.method, self.uri, self.headers, self.body)
    }
}

impl fmt::Debug for ProxyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyRequest")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Upstream answer. Headers keep the case-insensitive, last-write-wins semantics of `HeaderMap`.
pub struct ProxyResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl ProxyResponse {
    pub fn new(status: StatusCode, body: Body) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The fetch "ok" predicate: 2xx only. Redirects are followed by the clients, so a 3xx that
    /// reaches this point is not ok either.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Rebuild as a downstream response with the same status, headers and body.
    pub fn into_response(self) -> Response {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl fmt::Debug for ProxyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Platform HTTP client used to reach upstream origins. One call per inbound request; no retry.
#[async_trait(?Send)]
pub trait ProxyClient: Send + Sync {
    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, EdgeError>;
}

/// Cloneable handle adapters insert into request extensions.
#[derive(Clone)]
pub struct ProxyHandle {
    client: Arc<dyn ProxyClient>,
}

impl ProxyHandle {
    pub fn new(client: Arc<dyn ProxyClient>) -> Self {
        Self { client }
    }

    pub fn with_client<C>(client: C) -> Self
    where
        C: ProxyClient + 'static,
    {
        Self::new(Arc::new(client))
    }

    pub async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, EdgeError> {
        self.client.send(request).await
    }
}

impl fmt::Debug for ProxyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{header::CONTENT_TYPE, HeaderName, HeaderValue};
    use bytes::Bytes;
    use futures::executor::block_on;
    use futures_util::stream;
    use std::io;

    struct PngClient;

    #[async_trait(?Send)]
    impl ProxyClient for PngClient {
        async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, EdgeError> {
            let (method, uri, headers, body) = request.into_parts();
            assert_eq!(method, Method::GET);
            assert_eq!(uri, Uri::from_static("https://coc.codes/images/badge/2024063532"));
            assert!(headers.is_empty());
            assert!(body.is_empty());

            let chunks = stream::iter(vec![
                Ok::<_, io::Error>(Bytes::from_static(b"\x89PNG")),
                Ok(Bytes::from_static(b"...")),
            ]);
            let mut response = ProxyResponse::new(StatusCode::OK, Body::from_stream(chunks));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
            Ok(response)
        }
    }

    struct FailingClient;

    #[async_trait(?Send)]
    impl ProxyClient for FailingClient {
        async fn send(&self, _request: ProxyRequest) -> Result<ProxyResponse, EdgeError> {
            Err(EdgeError::internal(anyhow::anyhow!("connection refused")))
        }
    }

    fn badge_request() -> ProxyRequest {
        ProxyRequest::new(
            Method::GET,
            Uri::from_static("https://coc.codes/images/badge/2024063532"),
        )
    }

    #[test]
    fn upstream_response_keeps_status_headers_and_stream() {
        let handle = ProxyHandle::with_client(PngClient);
        let response = block_on(handle.send(badge_request()))
            .expect("response")
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
        let bytes = block_on(response.into_body().collect()).expect("body");
        assert_eq!(bytes.as_ref(), b"\x89PNG...");
    }

    #[test]
    fn client_errors_propagate() {
        let handle = ProxyHandle::with_client(FailingClient);
        let err = block_on(handle.send(badge_request())).expect_err("error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn ok_predicate_accepts_only_success() {
        for (status, ok) in [
            (StatusCode::OK, true),
            (StatusCode::NO_CONTENT, true),
            (StatusCode::MOVED_PERMANENTLY, false),
            (StatusCode::NOT_MODIFIED, false),
            (StatusCode::NOT_FOUND, false),
            (StatusCode::BAD_GATEWAY, false),
        ] {
            assert_eq!(ProxyResponse::new(status, Body::empty()).is_ok(), ok, "{status}");
        }
    }

    #[test]
    fn header_insert_is_last_write_wins() {
        let mut response = ProxyResponse::new(StatusCode::OK, Body::empty());
        response
            .headers_mut()
            .insert(
                HeaderName::from_bytes(b"Access-Control-Allow-Origin").expect("name"),
                HeaderValue::from_static("https://a.example"),
            );
        response
            .headers_mut()
            .insert("access-control-allow-origin", HeaderValue::from_static("*"));
        let values: Vec<_> = response
            .headers()
            .get_all("access-control-allow-origin")
            .iter()
            .collect();
        assert_eq!(values, vec![&HeaderValue::from_static("*")]);
    }

    #[test]
    fn request_headers_can_be_added() {
        let mut request = badge_request();
        request
            .headers_mut()
            .insert("x-trace", HeaderValue::from_static("1"));
        *request.body_mut() = Body::from("ignored");
        assert!(request.headers().contains_key("x-trace"));
        assert_eq!(request.method(), &Method::GET);
        assert!(format!("{:?}", request).contains("coc.codes"));
    }
}
