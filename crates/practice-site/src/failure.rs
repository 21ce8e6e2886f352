use practice_edge_core::body::Body;
use practice_edge_core::error::EdgeError;
use practice_edge_core::http::{Response, StatusCode};
use practice_edge_core::response::response_with_body;
use thiserror::Error;

/// Fixed plain-text bodies one proxy answers with when it cannot serve the upstream resource.
#[derive(Clone, Copy, Debug)]
pub struct FailureText {
    pub unavailable: &'static str,
    pub transport: &'static str,
}

/// Why a proxy could not pass an upstream response through.
#[derive(Debug, Error)]
pub enum ProxyFailure {
    /// The upstream answered with a non-2xx status.
    #[error("upstream answered {status}")]
    UpstreamUnavailable { status: StatusCode },
    /// The request never produced an upstream response.
    #[error("upstream fetch failed: {reason}")]
    TransportFailure { reason: String },
}

impl ProxyFailure {
    pub fn transport(reason: impl Into<String>) -> Self {
        ProxyFailure::TransportFailure {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyFailure::UpstreamUnavailable { .. } => StatusCode::NOT_FOUND,
            ProxyFailure::TransportFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed-text response without CORS headers. Transport failures log one error line.
    pub fn into_response(self, text: &FailureText) -> Response {
        let body = match &self {
            ProxyFailure::UpstreamUnavailable { .. } => text.unavailable,
            ProxyFailure::TransportFailure { .. } => {
                log::error!("{}: {}", text.transport, self);
                text.transport
            }
        };
        response_with_body(self.status(), Body::from(body))
    }
}

impl From<EdgeError> for ProxyFailure {
    fn from(err: EdgeError) -> Self {
        ProxyFailure::transport(err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_edge_core::cors::has_cors_headers;
    use practice_edge_core::http::header::CONTENT_TYPE;

    const TEXT: FailureText = FailureText {
        unavailable: "Thing not found",
        transport: "Failed to fetch thing",
    };

    #[test]
    fn unavailable_is_404_with_fixed_text() {
        let response = ProxyFailure::UpstreamUnavailable {
            status: StatusCode::BAD_GATEWAY,
        }
        .into_response(&TEXT);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body().as_bytes(), Some(&b"Thing not found"[..]));
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert!(!has_cors_headers(response.headers()));
    }

    #[test]
    fn transport_is_500_with_fixed_text() {
        let response = ProxyFailure::transport("dns lookup failed").into_response(&TEXT);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body().as_bytes(), Some(&b"Failed to fetch thing"[..]));
        assert!(!has_cors_headers(response.headers()));
    }

    #[test]
    fn edge_errors_become_transport_failures() {
        let failure = ProxyFailure::from(EdgeError::internal(io_error("connection reset")));
        assert_eq!(failure.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(failure.to_string().contains("connection reset"));
    }

    fn io_error(message: &str) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::ConnectionReset, message.to_string())
    }
}
