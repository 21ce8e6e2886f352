use practice_edge_core::context::RequestContext;
use practice_edge_core::cors::CorsPolicy;
use practice_edge_core::http::{header::CONTENT_TYPE, Method, Response, Uri};
use practice_edge_core::manifest::MediaProxyConfig;
use practice_edge_core::proxy::ProxyRequest;

use crate::failure::{FailureText, ProxyFailure};

pub const MEDIA_FAILURE: FailureText = FailureText {
    unavailable: "Media not found",
    transport: "Failed to fetch media",
};

/// Proxies `<prefix><suffix>` to `<base>/<suffix>` with permissive CORS.
///
/// The suffix is forwarded verbatim: `..` segments and encoded separators are not rejected, so a
/// crafted path can address any resource on the media origin.
#[derive(Clone, Debug)]
pub struct MediaProxy {
    base: String,
    prefix: String,
    cors: CorsPolicy,
}

impl MediaProxy {
    pub fn new(base: impl Into<String>, prefix: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            prefix: prefix.into(),
            cors: CorsPolicy::permissive(),
        }
    }

    pub fn from_config(config: &MediaProxyConfig) -> Self {
        Self::new(config.upstream.clone(), config.prefix.clone())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Upstream URL for an inbound path: the first occurrence of the prefix is removed and the
    /// remainder appended to the base.
    pub fn upstream_url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.replacen(&self.prefix, "", 1))
    }

    pub async fn handle(&self, ctx: RequestContext) -> Response {
        if ctx.method() == Method::OPTIONS {
            return self.cors.preflight();
        }

        match self.fetch(&ctx).await {
            Ok(response) => response,
            Err(failure) => failure.into_response(&MEDIA_FAILURE),
        }
    }

    async fn fetch(&self, ctx: &RequestContext) -> Result<Response, ProxyFailure> {
        let handle = ctx
            .proxy_handle()
            .ok_or_else(|| ProxyFailure::transport("no upstream client installed"))?;
        let target = self.upstream_url(ctx.path());
        let uri: Uri = target
            .parse()
            .map_err(|err| ProxyFailure::transport(format!("invalid media URL {target}: {err}")))?;

        let upstream = handle.send(ProxyRequest::new(Method::GET, uri)).await?;
        if !upstream.is_ok() {
            return Err(ProxyFailure::UpstreamUnavailable {
                status: upstream.status(),
            });
        }

        let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
        let mut response = upstream.into_response();
        let headers = response.headers_mut();
        self.cors.apply(headers);
        if let Some(content_type) = content_type {
            headers.insert(CONTENT_TYPE, content_type);
        }
        Ok(response)
    }
}

impl Default for MediaProxy {
    fn default() -> Self {
        Self::from_config(&MediaProxyConfig::default())
    }
}
