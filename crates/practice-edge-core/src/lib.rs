//! Portable request/response primitives, routing and upstream-proxy seams shared by the practice
//! site handlers and the edge adapters that host them.

pub mod app;
pub mod body;
pub mod context;
pub mod cors;
pub mod error;
pub mod handler;
pub mod http;
pub mod manifest;
pub mod middleware;
pub mod proxy;
pub mod response;
pub mod router;
