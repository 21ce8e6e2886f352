use axum::body::Body as AxumBody;
use axum::http::Request;
use practice_edge_core::body::Body;
use practice_edge_core::http::Request as CoreRequest;
use practice_edge_core::proxy::ProxyHandle;

/// Convert an inbound axum request into a core request. The body stays a stream and `proxy` is
/// installed in the extensions so handlers can reach upstream origins.
pub fn into_core_request(request: Request<AxumBody>, proxy: ProxyHandle) -> CoreRequest {
    let (parts, body) = request.into_parts();
    let body = Body::from_stream(body.into_data_stream());
    let mut core_request = CoreRequest::from_parts(parts, body);
    core_request.extensions_mut().insert(proxy);
    core_request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::AxumProxyClient;
    use futures::executor::block_on;
    use practice_edge_core::http::Method;

    #[test]
    fn keeps_request_line_headers_and_body() {
        let request = Request::builder()
            .method(Method::GET)
            .uri("/media/a.png?w=1")
            .header("sec-ch-ua-mobile", "?1")
            .body(AxumBody::from("payload"))
            .expect("request");

        let core_request =
            into_core_request(request, ProxyHandle::with_client(AxumProxyClient::default()));
        assert_eq!(core_request.method(), &Method::GET);
        assert_eq!(core_request.uri().path(), "/media/a.png");
        assert_eq!(core_request.uri().query(), Some("w=1"));
        assert_eq!(core_request.headers()["sec-ch-ua-mobile"], "?1");
        assert!(core_request.extensions().get::<ProxyHandle>().is_some());

        let (_, body) = core_request.into_parts();
        assert!(body.is_stream());
        let bytes = block_on(body.collect()).expect("body");
        assert_eq!(bytes.as_ref(), b"payload");
    }
}
