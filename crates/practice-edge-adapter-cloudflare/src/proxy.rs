use async_trait::async_trait;
use practice_edge_core::body::Body;
use practice_edge_core::error::EdgeError;
use practice_edge_core::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use practice_edge_core::proxy::{ProxyClient, ProxyRequest, ProxyResponse};
use worker::{
    wasm_bindgen::JsValue, Fetch, Headers, Method as CfMethod, Request as CfRequest, RequestInit,
};

/// Upstream client backed by the Workers `fetch` binding. Bodies are buffered.
pub struct CloudflareProxyClient;

#[async_trait(?Send)]
impl ProxyClient for CloudflareProxyClient {
    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, EdgeError> {
        let (method, uri, headers, body) = request.into_parts();
        let cf_request = build_cf_request(&method, &uri, &headers, body).await?;
        let mut cf_response = Fetch::Request(cf_request)
            .send()
            .await
            .map_err(EdgeError::internal)?;

        let status = StatusCode::from_u16(cf_response.status_code()).map_err(EdgeError::internal)?;
        let mut proxy_response = ProxyResponse::new(status, Body::empty());
        for (name, value) in cf_response.headers().entries() {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                proxy_response.headers_mut().append(name, value);
            }
        }

        let bytes = cf_response.bytes().await.map_err(EdgeError::internal)?;
        *proxy_response.body_mut() = Body::from(bytes);
        Ok(proxy_response)
    }
}

async fn build_cf_request(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Body,
) -> Result<CfRequest, EdgeError> {
    let mut init = RequestInit::new();
    init.with_method(cf_method(method));

    let cf_headers = Headers::new();
    for (name, value) in headers.iter() {
        if let Ok(value) = value.to_str() {
            cf_headers
                .append(name.as_str(), value)
                .map_err(EdgeError::internal)?;
        }
    }
    init.with_headers(cf_headers);

    if !body.is_empty() {
        let bytes = body.collect().await.map_err(EdgeError::internal)?;
        let array = worker::js_sys::Uint8Array::from(bytes.as_ref());
        init.with_body(Some(JsValue::from(array)));
    }

    CfRequest::new_with_init(&uri.to_string(), &init).map_err(EdgeError::internal)
}

fn cf_method(method: &Method) -> CfMethod {
    match *method {
        Method::POST => CfMethod::Post,
        Method::PUT => CfMethod::Put,
        Method::PATCH => CfMethod::Patch,
        Method::DELETE => CfMethod::Delete,
        Method::HEAD => CfMethod::Head,
        Method::OPTIONS => CfMethod::Options,
        _ => CfMethod::Get,
    }
}
