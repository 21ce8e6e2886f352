use std::time::Duration;

use async_trait::async_trait;
use practice_edge_core::body::Body;
use practice_edge_core::error::EdgeError;
use practice_edge_core::http::{HeaderName, HeaderValue, Method, StatusCode};
use practice_edge_core::proxy::{ProxyClient, ProxyRequest, ProxyResponse};
use reqwest::{header, Client};

/// Transport timeout applied to every upstream call.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed upstream client. Redirects are followed and the body is buffered.
#[derive(Clone)]
pub struct AxumProxyClient {
    client: Client,
}

impl AxumProxyClient {
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                log::warn!("falling back to default reqwest client: {err}");
                Client::new()
            });
        Self { client }
    }
}

impl Default for AxumProxyClient {
    fn default() -> Self {
        Self::with_timeout(UPSTREAM_TIMEOUT)
    }
}

#[async_trait(?Send)]
impl ProxyClient for AxumProxyClient {
    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, EdgeError> {
        let (method, uri, headers, body) = request.into_parts();
        log::debug!("upstream {} {}", method, uri);

        let mut builder = self
            .client
            .request(reqwest_method(&method)?, uri.to_string());
        for (name, value) in headers.iter() {
            let name = header::HeaderName::from_bytes(name.as_str().as_bytes())
                .map_err(EdgeError::internal)?;
            let value =
                header::HeaderValue::from_bytes(value.as_bytes()).map_err(EdgeError::internal)?;
            builder = builder.header(name, value);
        }
        if !body.is_empty() {
            let bytes = body.collect().await.map_err(EdgeError::internal)?;
            builder = builder.body(bytes.to_vec());
        }

        let response = builder.send().await.map_err(EdgeError::internal)?;
        let status =
            StatusCode::from_u16(response.status().as_u16()).map_err(EdgeError::internal)?;
        let mut proxy_response = ProxyResponse::new(status, Body::empty());
        for (name, value) in response.headers().iter() {
            let name =
                HeaderName::from_bytes(name.as_str().as_bytes()).map_err(EdgeError::internal)?;
            let value = HeaderValue::from_bytes(value.as_bytes()).map_err(EdgeError::internal)?;
            proxy_response.headers_mut().append(name, value);
        }

        let bytes = response.bytes().await.map_err(EdgeError::internal)?;
        *proxy_response.body_mut() = Body::from(bytes);
        Ok(proxy_response)
    }
}

fn reqwest_method(method: &Method) -> Result<reqwest::Method, EdgeError> {
    reqwest::Method::from_bytes(method.as_str().as_bytes()).map_err(EdgeError::internal)
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
    use axum::response::{AppendHeaders, Redirect};
    use axum::{routing::get, routing::post, Router};
    use practice_edge_core::http::Uri;
    use tokio::net::TcpListener;

    async fn start_upstream(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{}", addr)
    }

    fn uri(base: &str, path: &str) -> Uri {
        format!("{base}{path}").parse().expect("uri")
    }

    #[tokio::test]
    async fn fetches_bytes_and_headers() {
        let app = Router::new().route(
            "/badge",
            get(|| async { ([(CONTENT_TYPE, "image/svg+xml")], "<svg/>") }),
        );
        let base = start_upstream(app).await;

        let response = AxumProxyClient::default()
            .send(ProxyRequest::new(Method::GET, uri(&base, "/badge")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.is_ok());
        assert_eq!(response.headers()["content-type"], "image/svg+xml");
        assert_eq!(response.body().as_bytes(), Some(&b"<svg/>"[..]));
    }

    #[tokio::test]
    async fn keeps_repeated_response_headers() {
        let app = Router::new().route(
            "/cookies",
            get(|| async {
                (
                    AppendHeaders([(SET_COOKIE, "a=1"), (SET_COOKIE, "b=2")]),
                    "ok",
                )
            }),
        );
        let base = start_upstream(app).await;

        let response = AxumProxyClient::default()
            .send(ProxyRequest::new(Method::GET, uri(&base, "/cookies")))
            .await
            .expect("response");
        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 2);
    }

    #[tokio::test]
    async fn follows_redirects() {
        let app = Router::new()
            .route("/old", get(|| async { Redirect::temporary("/new") }))
            .route("/new", get(|| async { "moved" }));
        let base = start_upstream(app).await;

        let response = AxumProxyClient::default()
            .send(ProxyRequest::new(Method::GET, uri(&base, "/old")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_bytes(), Some(&b"moved"[..]));
    }

    #[tokio::test]
    async fn reports_error_statuses_as_responses() {
        let base = start_upstream(Router::new()).await;
        let response = AxumProxyClient::default()
            .send(ProxyRequest::new(Method::GET, uri(&base, "/missing")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn sends_request_body() {
        let app = Router::new().route("/echo", post(|body: axum::body::Bytes| async move { body }));
        let base = start_upstream(app).await;

        let mut request = ProxyRequest::new(Method::POST, uri(&base, "/echo"));
        *request.body_mut() = Body::from("payload");
        let response = AxumProxyClient::default()
            .send(request)
            .await
            .expect("response");
        assert_eq!(response.body().as_bytes(), Some(&b"payload"[..]));
    }

    #[tokio::test]
    async fn connection_refused_is_an_error() {
        let result = AxumProxyClient::default()
            .send(ProxyRequest::new(
                Method::GET,
                Uri::from_static("http://127.0.0.1:1/"),
            ))
            .await;
        let err = result.expect_err("refused");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
