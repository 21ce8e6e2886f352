use practice_edge_core::context::RequestContext;
use practice_edge_core::cors::{CorsPolicy, ONE_DAY_SECS};
use practice_edge_core::http::{header::CONTENT_TYPE, HeaderValue, Method, Response, Uri};
use practice_edge_core::manifest::BadgeProxyConfig;
use practice_edge_core::proxy::ProxyRequest;

use crate::failure::{FailureText, ProxyFailure};

pub const BADGE_PATH: &str = "/coc-badge";

pub const BADGE_FAILURE: FailureText = FailureText {
    unavailable: "COC Badge not found",
    transport: "Failed to fetch COC badge",
};

/// Re-serves one fixed badge image with permissive CORS and `Content-Type: image/png`.
///
/// Every method except `OPTIONS` is treated as a fetch.
#[derive(Clone, Debug)]
pub struct BadgeProxy {
    upstream: String,
    cors: CorsPolicy,
}

impl BadgeProxy {
    pub fn new(upstream: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            cors: CorsPolicy::permissive().with_max_age(ONE_DAY_SECS),
        }
    }

    pub fn from_config(config: &BadgeProxyConfig) -> Self {
        Self::new(config.upstream.clone())
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub async fn handle(&self, ctx: RequestContext) -> Response {
        if ctx.method() == Method::OPTIONS {
            return self.cors.preflight();
        }

        match self.fetch(&ctx).await {
            Ok(response) => response,
            Err(failure) => failure.into_response(&BADGE_FAILURE),
        }
    }

    async fn fetch(&self, ctx: &RequestContext) -> Result<Response, ProxyFailure> {
        let handle = ctx
            .proxy_handle()
            .ok_or_else(|| ProxyFailure::transport("no upstream client installed"))?;
        let uri: Uri = self.upstream.parse().map_err(|err| {
            ProxyFailure::transport(format!("invalid badge URL {}: {}", self.upstream, err))
        })?;

        let upstream = handle.send(ProxyRequest::new(Method::GET, uri)).await?;
        if !upstream.is_ok() {
            return Err(ProxyFailure::UpstreamUnavailable {
                status: upstream.status(),
            });
        }

        let mut response = upstream.into_response();
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
        self.cors.apply(headers);
        Ok(response)
    }
}

impl Default for BadgeProxy {
    fn default() -> Self {
        Self::from_config(&BadgeProxyConfig::default())
    }
}
