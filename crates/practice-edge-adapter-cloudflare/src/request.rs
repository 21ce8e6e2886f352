use practice_edge_core::app::App;
use practice_edge_core::body::Body;
use practice_edge_core::error::EdgeError;
use practice_edge_core::http::{request_builder, Method as CoreMethod, Request, Uri};
use practice_edge_core::proxy::ProxyHandle;
use worker::{Context, Env, Error as WorkerError, Method, Request as CfRequest, Response as CfResponse};

use crate::proxy::CloudflareProxyClient;
use crate::response::from_core_response;

/// Converts a fetch event request, installing [`CloudflareProxyClient`] for upstream calls.
pub async fn into_core_request(mut req: CfRequest) -> Result<Request, EdgeError> {
    let method = into_core_method(req.method());
    let url = req
        .url()
        .map_err(|err| EdgeError::bad_request(format!("invalid URL: {}", err)))?;
    let uri: Uri = url
        .as_str()
        .parse()
        .map_err(|err| EdgeError::bad_request(format!("invalid URI: {}", err)))?;

    let mut builder = request_builder().method(method).uri(uri);
    for (name, value) in req.headers().entries() {
        builder = builder.header(name.as_str(), value);
    }

    let bytes = req.bytes().await.map_err(EdgeError::internal)?;
    let mut request = builder
        .body(Body::from(bytes))
        .map_err(EdgeError::internal)?;
    request
        .extensions_mut()
        .insert(ProxyHandle::with_client(CloudflareProxyClient));
    Ok(request)
}

pub async fn dispatch(
    app: &App,
    req: CfRequest,
    _env: Env,
    _ctx: Context,
) -> Result<CfResponse, WorkerError> {
    let core_request = into_core_request(req).await.map_err(edge_error_to_worker)?;
    let response = app.router().oneshot(core_request).await;
    from_core_response(response).map_err(edge_error_to_worker)
}

fn edge_error_to_worker(err: EdgeError) -> WorkerError {
    WorkerError::RustError(err.to_string())
}

fn into_core_method(method: Method) -> CoreMethod {
    CoreMethod::from_bytes(method.as_ref().as_bytes()).unwrap_or(CoreMethod::GET)
}
