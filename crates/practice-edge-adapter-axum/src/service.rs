use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body as AxumBody;
use axum::http::{Request, Response};
use practice_edge_core::proxy::ProxyHandle;
use practice_edge_core::router::RouterService;
use tokio::{runtime::Handle, task};
use tower::Service;

use crate::proxy::AxumProxyClient;
use crate::request::into_core_request;
use crate::response::into_axum_response;

/// Tower service running a core router behind axum.
///
/// Core handler futures are not `Send`, so each request is driven to completion with
/// `block_in_place`; a multi-thread tokio runtime is required.
#[derive(Clone)]
pub struct PracticeEdgeAxumService {
    router: RouterService,
    proxy: ProxyHandle,
}

impl PracticeEdgeAxumService {
    /// Service whose handlers reach upstreams through a shared [`AxumProxyClient`].
    pub fn new(router: RouterService) -> Self {
        Self::with_proxy(router, ProxyHandle::with_client(AxumProxyClient::default()))
    }

    pub fn with_proxy(router: RouterService, proxy: ProxyHandle) -> Self {
        Self { router, proxy }
    }
}

impl Service<Request<AxumBody>> for PracticeEdgeAxumService {
    type Response = Response<AxumBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<AxumBody>) -> Self::Future {
        let router = self.router.clone();
        let proxy = self.proxy.clone();
        Box::pin(async move {
            let response = task::block_in_place(move || {
                let core_request = into_core_request(request, proxy);
                into_axum_response(Handle::current().block_on(router.oneshot(core_request)))
            });
            Ok(response)
        })
    }
}
