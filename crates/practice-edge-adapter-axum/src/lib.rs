//! Native host for practice-edge routers: axum serves inbound traffic and reqwest reaches the
//! upstream origins.

#[cfg(feature = "axum")]
mod dev_server;
#[cfg(feature = "axum")]
mod proxy;
#[cfg(feature = "axum")]
mod request;
#[cfg(feature = "axum")]
mod response;
#[cfg(feature = "axum")]
mod service;

#[cfg(feature = "axum")]
pub use dev_server::{init_logger, run_app, AxumDevServer, AxumDevServerConfig};
#[cfg(feature = "axum")]
pub use proxy::{AxumProxyClient, UPSTREAM_TIMEOUT};
#[cfg(feature = "axum")]
pub use request::into_core_request;
#[cfg(feature = "axum")]
pub use response::into_axum_response;
#[cfg(feature = "axum")]
pub use service::PracticeEdgeAxumService;
