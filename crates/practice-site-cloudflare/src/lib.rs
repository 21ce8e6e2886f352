//! Worker entry point. Build for `wasm32-unknown-unknown` and run with `wrangler dev`.

#[cfg(target_arch = "wasm32")]
use practice_site::SiteApp;
#[cfg(target_arch = "wasm32")]
use worker::*;

#[cfg(target_arch = "wasm32")]
#[event(fetch)]
pub async fn main(req: Request, env: Env, ctx: Context) -> Result<Response> {
    practice_edge_adapter_cloudflare::run_app::<SiteApp>(
        include_str!("../../../practice-edge.toml"),
        req,
        env,
        ctx,
    )
    .await
}
