use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use practice_edge_core::body::Body;
use practice_edge_core::context::RequestContext;
use practice_edge_core::error::EdgeError;
use practice_edge_core::http::{request_builder, HeaderMap, Method, StatusCode};
use practice_edge_core::proxy::{ProxyClient, ProxyHandle, ProxyRequest, ProxyResponse};

/// Canned upstream that records every URI it is asked for.
#[derive(Clone)]
pub(crate) struct StubClient {
    outcome: Outcome,
    pub(crate) seen: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
enum Outcome {
    Respond {
        status: StatusCode,
        headers: HeaderMap,
        body: &'static [u8],
    },
    Fail,
}

impl StubClient {
    pub(crate) fn respond(status: StatusCode, headers: HeaderMap, body: &'static [u8]) -> Self {
        Self {
            outcome: Outcome::Respond {
                status,
                headers,
                body,
            },
            seen: Arc::default(),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            outcome: Outcome::Fail,
            seen: Arc::default(),
        }
    }

    pub(crate) fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("lock").clone()
    }
}

#[async_trait(?Send)]
impl ProxyClient for StubClient {
    async fn send(&self, request: ProxyRequest) -> Result<ProxyResponse, EdgeError> {
        assert_eq!(request.method(), &Method::GET);
        assert!(request.headers().is_empty());
        self.seen.lock().expect("lock").push(request.uri().to_string());

        match &self.outcome {
            Outcome::Respond {
                status,
                headers,
                body,
            } => {
                let mut response = ProxyResponse::new(*status, Body::from(*body));
                *response.headers_mut() = headers.clone();
                Ok(response)
            }
            Outcome::Fail => Err(EdgeError::internal(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        }
    }
}

pub(crate) fn context(method: Method, uri: &str, client: Option<StubClient>) -> RequestContext {
    let mut request = request_builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    if let Some(client) = client {
        request
            .extensions_mut()
            .insert(ProxyHandle::with_client(client));
    }
    RequestContext::new(request)
}
