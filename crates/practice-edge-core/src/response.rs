use crate::body::Body;
use crate::http::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    HeaderValue, Response, StatusCode,
};

/// Convert handler return values into a `Response`.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for Body {
    fn into_response(self) -> Response {
        response_with_body(StatusCode::OK, self)
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response {
        response_with_body(StatusCode::OK, Body::text(self))
    }
}

impl IntoResponse for String {
    fn into_response(self) -> Response {
        response_with_body(StatusCode::OK, Body::text(self))
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Response {
        response_with_body(StatusCode::NO_CONTENT, Body::empty())
    }
}

impl<T> IntoResponse for (StatusCode, T)
where
    T: IntoResponse,
{
    fn into_response(self) -> Response {
        let (status, inner) = self;
        let mut response = inner.into_response();
        *response.status_mut() = status;
        response
    }
}

/// JSON payload wrapper; serialisation failures surface as a 500 with a plain-text body.
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        match Body::json(&self.0) {
            Ok(body) => {
                let mut response = response_with_body(StatusCode::OK, body);
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
            Err(err) => {
                log::error!("failed to serialise JSON response: {err}");
                response_with_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Body::text("internal error"),
                )
            }
        }
    }
}

/// Build a response with `status` and `body`. Non-empty buffered bodies are labelled as UTF-8
/// plain text and given a `Content-Length`.
pub fn response_with_body(status: StatusCode, body: Body) -> Response {
    let length = body.as_bytes().map(<[u8]>::len).unwrap_or(0);
    let mut response = Response::new(body);
    *response.status_mut() = status;

    if length > 0 {
        let headers = response.headers_mut();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
    }

    response
}
