use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use matchit::Router as PathRouter;
use tower_service::Service;

use crate::body::Body;
use crate::context::RequestContext;
use crate::error::EdgeError;
use crate::handler::{BoxHandler, IntoHandler};
use crate::http::{HandlerFuture, Method, Request, Response};
use crate::middleware::{BoxMiddleware, Middleware, Next};
use crate::response::IntoResponse;

/// Methods registered by [`RouterBuilder::any`].
pub const ANY_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteInfo {
    method: Method,
    path: String,
}

impl RouteInfo {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Default)]
pub struct RouterBuilder {
    routes: HashMap<Method, PathRouter<BoxHandler>>,
    middlewares: Vec<BoxMiddleware>,
    route_info: Vec<RouteInfo>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<H>(mut self, path: &str, method: Method, handler: H) -> Self
    where
        H: IntoHandler,
    {
        self.add_route(path, method, handler.into_handler());
        self
    }

    pub fn get<H>(self, path: &str, handler: H) -> Self
    where
        H: IntoHandler,
    {
        self.route(path, Method::GET, handler)
    }

    pub fn post<H>(self, path: &str, handler: H) -> Self
    where
        H: IntoHandler,
    {
        self.route(path, Method::POST, handler)
    }

    pub fn options<H>(self, path: &str, handler: H) -> Self
    where
        H: IntoHandler,
    {
        self.route(path, Method::OPTIONS, handler)
    }

    /// Register one handler for every method in [`ANY_METHODS`].
    pub fn any<H>(mut self, path: &str, handler: H) -> Self
    where
        H: IntoHandler,
    {
        let handler = handler.into_handler();
        for method in ANY_METHODS {
            self.add_route(path, method, Arc::clone(&handler));
        }
        self
    }

    /// Middleware run in registration order, outermost first.
    pub fn middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> RouterService {
        RouterService {
            inner: Arc::new(RouterInner {
                routes: self.routes,
                middlewares: self.middlewares,
                route_info: self.route_info,
            }),
        }
    }

    fn add_route(&mut self, path: &str, method: Method, handler: BoxHandler) {
        self.routes
            .entry(method.clone())
            .or_default()
            .insert(path, handler)
            .unwrap_or_else(|err| panic!("duplicate route definition for {}: {}", path, err));
        self.route_info.push(RouteInfo::new(method, path));
    }
}

/// Immutable route table shared by every adapter. Cloning is cheap.
#[derive(Clone)]
pub struct RouterService {
    inner: Arc<RouterInner>,
}

impl RouterService {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn routes(&self) -> &[RouteInfo] {
        &self.inner.route_info
    }

    /// Dispatch and fold routing or handler errors into their rendered responses.
    pub async fn oneshot(&self, request: Request) -> Response {
        match self.inner.dispatch(request).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        }
    }
}

struct RouterInner {
    routes: HashMap<Method, PathRouter<BoxHandler>>,
    middlewares: Vec<BoxMiddleware>,
    route_info: Vec<RouteInfo>,
}

enum RouteMatch<'a> {
    Found(&'a BoxHandler),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl RouterInner {
    async fn dispatch(&self, request: Request) -> Result<Response, EdgeError> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        match self.find_route(&method, &path) {
            RouteMatch::Found(handler) => {
                let ctx = RequestContext::new(request);
                let mut response = Next::new(&self.middlewares, handler.as_ref())
                    .run(ctx)
                    .await?;
                if method == Method::HEAD {
                    *response.body_mut() = Body::empty();
                }
                Ok(response)
            }
            RouteMatch::MethodNotAllowed(allowed) => {
                Err(EdgeError::method_not_allowed(&method, &allowed))
            }
            RouteMatch::NotFound => Err(EdgeError::not_found(path)),
        }
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<&BoxHandler> {
        self.routes
            .get(method)
            .and_then(|router| router.at(path).ok())
            .map(|matched| matched.value)
    }

    /// HEAD falls back to the GET route when no HEAD route is registered.
    fn find_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let handler = match self.lookup(method, path) {
            None if *method == Method::HEAD => self.lookup(&Method::GET, path),
            found => found,
        };
        if let Some(handler) = handler {
            return RouteMatch::Found(handler);
        }

        let mut allowed: HashSet<Method> = self
            .routes
            .iter()
            .filter(|(_, router)| router.at(path).is_ok())
            .map(|(candidate, _)| candidate.clone())
            .collect();
        if allowed.contains(&Method::GET) {
            allowed.insert(Method::HEAD);
        }

        if allowed.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed(allowed.into_iter().collect())
        }
    }
}

impl Service<Request> for RouterService {
    type Response = Response;
    type Error = EdgeError;
    type Future = HandlerFuture;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.dispatch(request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{
        header::{ALLOW, CONTENT_TYPE},
        request_builder, StatusCode,
    };
    use futures::executor::block_on;

    fn request(method: Method, uri: &str) -> Request {
        request_builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn echo_path(ctx: RequestContext) -> Result<String, EdgeError> {
        Ok(ctx.path().to_string())
    }

    async fn method_name(ctx: RequestContext) -> Result<String, EdgeError> {
        Ok(ctx.method().as_str().to_string())
    }

    #[test]
    fn catch_all_matches_nested_segments() {
        let service = RouterService::builder()
            .get("/media/{*path}", echo_path)
            .build();

        let response = block_on(service.oneshot(request(Method::GET, "/media/a/b/c.png")));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().as_bytes(), Some(&b"/media/a/b/c.png"[..]));
    }

    #[test]
    fn head_is_served_by_get_route_without_body() {
        let service = RouterService::builder()
            .get("/media/{*path}", method_name)
            .build();

        let response = block_on(service.oneshot(request(Method::HEAD, "/media/a.png")));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert!(response.body().is_empty());

        let response = block_on(service.oneshot(request(Method::GET, "/media/a.png")));
        assert_eq!(response.body().as_bytes(), Some(&b"GET"[..]));
    }

    #[test]
    fn head_route_takes_precedence_over_get() {
        let service = RouterService::builder()
            .get("/coc-badge", method_name)
            .route("/coc-badge", Method::HEAD, |_ctx: RequestContext| async move {
                Ok::<_, EdgeError>((StatusCode::ACCEPTED, "head"))
            })
            .build();

        let response = block_on(service.oneshot(request(Method::HEAD, "/coc-badge")));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(response.body().is_empty());
    }

    #[test]
    fn head_without_get_route_is_not_allowed() {
        let service = RouterService::builder()
            .post("/api/test", method_name)
            .build();

        let response = block_on(service.oneshot(request(Method::HEAD, "/api/test")));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "POST");
    }

    #[test]
    fn any_registers_every_method() {
        let service = RouterService::builder().any("/coc-badge", method_name).build();
        for method in [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS] {
            let response = block_on(service.oneshot(request(method.clone(), "/coc-badge")));
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.body().as_bytes(), Some(method.as_str().as_bytes()));
        }
        assert_eq!(service.routes().len(), ANY_METHODS.len());
    }

    #[test]
    fn unknown_path_is_not_found() {
        let service = RouterService::builder().get("/api/test", method_name).build();
        let err = block_on(service.clone().call(request(Method::GET, "/nope"))).expect_err("err");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn wrong_method_lists_allowed_methods() {
        let service = RouterService::builder()
            .get("/media/{*path}", echo_path)
            .options("/media/{*path}", echo_path)
            .build();

        let response = block_on(service.oneshot(request(Method::POST, "/media/x.png")));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD, OPTIONS");
    }

    #[test]
    fn routes_are_recorded_in_registration_order() {
        let service = RouterService::builder()
            .get("/api/test", method_name)
            .post("/api/test", method_name)
            .build();
        assert_eq!(
            service.routes(),
            &[
                RouteInfo::new(Method::GET, "/api/test"),
                RouteInfo::new(Method::POST, "/api/test"),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "duplicate route definition")]
    fn duplicate_routes_panic() {
        let _ = RouterService::builder()
            .get("/api/test", method_name)
            .get("/api/test", method_name);
    }
}
