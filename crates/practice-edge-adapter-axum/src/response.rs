use axum::body::Body as AxumBody;
use axum::http::{header::CONTENT_TYPE, HeaderValue, Response, StatusCode};
use futures::executor::block_on;
use practice_edge_core::body::Body;
use practice_edge_core::http::Response as CoreResponse;

/// Convert a core response for hyper.
///
/// Core streams are not `Send`, so streaming bodies are drained into one buffer first. A stream
/// that fails midway becomes a plain-text 500.
pub fn into_axum_response(response: CoreResponse) -> Response<AxumBody> {
    let (parts, body) = response.into_parts();
    let body = match body {
        Body::Once(bytes) => AxumBody::from(bytes),
        stream @ Body::Stream(_) => match block_on(stream.collect()) {
            Ok(bytes) => AxumBody::from(bytes),
            Err(err) => {
                tracing::error!("streaming response error: {err}");
                let mut response = Response::new(AxumBody::from("streaming response error"));
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response.headers_mut().insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                );
                return response;
            }
        },
    };

    Response::from_parts(parts, body)
}
