use anyhow::Error as AnyError;
use serde_json::json;
use thiserror::Error;

use crate::body::Body;
use crate::http::{
    header::{ALLOW, CONTENT_TYPE},
    HeaderValue, Method, Response, StatusCode,
};
use crate::response::{response_with_body, IntoResponse};

/// Framework-level error carrying an HTTP status code.
///
/// Proxy handlers never return these for upstream trouble; they build their own fixed responses.
/// `EdgeError` covers routing misses and adapter plumbing.
#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("{message}")]
    BadRequest { message: String },
    #[error("no route matched path: {path}")]
    NotFound { path: String },
    #[error("method {method} not allowed; allowed: {allowed}")]
    MethodNotAllowed { method: Method, allowed: String },
    #[error("internal error: {source}")]
    Internal {
        #[from]
        source: AnyError,
    },
}

impl EdgeError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        EdgeError::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        EdgeError::NotFound { path: path.into() }
    }

    pub fn method_not_allowed(method: &Method, allowed: &[Method]) -> Self {
        let mut names = allowed
            .iter()
            .map(|m| m.as_str().to_string())
            .collect::<Vec<_>>();
        names.sort();
        names.dedup();
        let allowed = if names.is_empty() {
            "(none)".to_string()
        } else {
            names.join(", ")
        };
        EdgeError::MethodNotAllowed {
            method: method.clone(),
            allowed,
        }
    }

    pub fn internal<E>(error: E) -> Self
    where
        E: Into<AnyError>,
    {
        EdgeError::Internal {
            source: error.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EdgeError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            EdgeError::NotFound { .. } => StatusCode::NOT_FOUND,
            EdgeError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            EdgeError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let allow = match &self {
            EdgeError::MethodNotAllowed { allowed, .. } => HeaderValue::from_str(allowed).ok(),
            _ => None,
        };
        let payload = json!({
            "error": {
                "status": status.as_u16(),
                "message": self.message(),
            }
        });

        let body = Body::json(&payload).unwrap_or_else(|_| Body::text("internal error"));
        let mut response = response_with_body(status, body);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(allow) = allow {
            response.headers_mut().insert(ALLOW, allow);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_reports_path() {
        let err = EdgeError::not_found("/missing");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "no route matched path: /missing");
    }

    #[test]
    fn method_not_allowed_lists_sorted_unique_methods() {
        let err = EdgeError::method_not_allowed(
            &Method::POST,
            &[Method::OPTIONS, Method::GET, Method::GET],
        );
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(err.message().ends_with("allowed: GET, OPTIONS"));
    }

    #[test]
    fn method_not_allowed_without_candidates() {
        let err = EdgeError::method_not_allowed(&Method::PUT, &[]);
        assert!(err.message().contains("(none)"));
    }

    #[test]
    fn internal_wraps_source() {
        let err = EdgeError::internal(anyhow::anyhow!("dns lookup failed"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("dns lookup failed"));
    }

    #[test]
    fn into_response_renders_json_payload() {
        let response = EdgeError::bad_request("invalid URI").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        let payload: serde_json::Value =
            serde_json::from_slice(response.body().as_bytes().expect("buffered")).expect("json");
        assert_eq!(payload["error"]["status"], 400);
        assert_eq!(payload["error"]["message"], "invalid URI");
    }
}
