//! Edge handlers for the practice website: the badge and media CORS proxies plus two small JSON
//! endpoints.

pub mod api;
pub mod app;
pub mod badge;
pub mod failure;
pub mod media;

pub use app::{build_router, SiteApp};

#[cfg(test)]
pub(crate) mod test_support;
