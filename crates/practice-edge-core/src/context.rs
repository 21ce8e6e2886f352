use crate::body::Body;
use crate::http::{HeaderMap, Method, Request};
use crate::proxy::ProxyHandle;

/// Request context exposed to handlers and middleware.
pub struct RequestContext {
    request: Request,
}

impl RequestContext {
    pub fn new(request: Request) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Inbound path as seen by the HTTP layer, without the query string.
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    pub fn body(&self) -> &Body {
        self.request.body()
    }

    /// Upstream client installed by the hosting adapter, if any.
    pub fn proxy_handle(&self) -> Option<ProxyHandle> {
        self.request.extensions().get::<ProxyHandle>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EdgeError;
    use crate::http::{request_builder, HeaderValue, StatusCode, Uri};
    use crate::proxy::{ProxyClient, ProxyRequest, ProxyResponse};
    use async_trait::async_trait;

    fn ctx(uri: &str) -> RequestContext {
        let request = request_builder()
            .method(Method::GET)
            .uri(uri)
            .header("sec-ch-ua-mobile", "?1")
            .body(Body::from("payload"))
            .expect("request");
        RequestContext::new(request)
    }

    #[test]
    fn path_excludes_query_string() {
        let ctx = ctx("/media/foo/bar.png?w=320");
        assert_eq!(ctx.path(), "/media/foo/bar.png");
        assert_eq!(ctx.method(), &Method::GET);
    }

    #[test]
    fn accessors_expose_request_parts() {
        let mut ctx = ctx("/media/foo/bar.png");
        assert_eq!(ctx.headers()["sec-ch-ua-mobile"], "?1");
        assert_eq!(ctx.body().as_bytes(), Some(&b"payload"[..]));

        ctx.request_mut()
            .headers_mut()
            .insert("ect", HeaderValue::from_static("2g"));
        let request = ctx.into_request();
        assert_eq!(request.headers()["ect"], "2g");
    }

    struct NoopClient;

    #[async_trait(?Send)]
    impl ProxyClient for NoopClient {
        async fn send(&self, _request: ProxyRequest) -> Result<ProxyResponse, EdgeError> {
            Ok(ProxyResponse::new(StatusCode::OK, Body::empty()))
        }
    }

    #[test]
    fn proxy_handle_is_read_from_extensions() {
        assert!(ctx("/coc-badge").proxy_handle().is_none());

        let mut request = request_builder()
            .uri("/coc-badge")
            .body(Body::empty())
            .expect("request");
        request
            .extensions_mut()
            .insert(ProxyHandle::with_client(NoopClient));
        let ctx = RequestContext::new(request);
        let handle = ctx.proxy_handle().expect("handle");
        let response = futures::executor::block_on(
            handle.send(ProxyRequest::new(Method::GET, Uri::from_static("https://coc.codes/"))),
        )
        .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
