//! Cloudflare Workers host for practice-edge routers.

#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
mod proxy;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
mod request;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
mod response;

#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub use proxy::CloudflareProxyClient;
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub use request::{dispatch, into_core_request};
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub use response::from_core_response;

/// Workers forward `console` output on their own; nothing to install.
pub fn init_logger() -> Result<(), log::SetLoggerError> {
    Ok(())
}

/// Builds `A` from the bundled manifest and dispatches one fetch event.
#[cfg(all(feature = "cloudflare", target_arch = "wasm32"))]
pub async fn run_app<A: practice_edge_core::app::Hooks>(
    manifest_src: &str,
    req: worker::Request,
    env: worker::Env,
    ctx: worker::Context,
) -> Result<worker::Response, worker::Error> {
    init_logger().map_err(|err| worker::Error::RustError(err.to_string()))?;
    let loader = practice_edge_core::manifest::ManifestLoader::load_from_str(manifest_src)
        .map_err(|err| worker::Error::RustError(format!("invalid manifest: {err}")))?;
    let app = A::build_app(loader.manifest());
    dispatch(&app, req, env, ctx).await
}
