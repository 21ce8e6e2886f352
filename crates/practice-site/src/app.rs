use std::sync::Arc;

use practice_edge_core::app::Hooks;
use practice_edge_core::context::RequestContext;
use practice_edge_core::error::EdgeError;
use practice_edge_core::manifest::Manifest;
use practice_edge_core::middleware::RequestLogger;
use practice_edge_core::router::RouterService;

use crate::api::{loading_profile, smoke_test};
use crate::badge::{BadgeProxy, BADGE_PATH};
use crate::media::MediaProxy;

pub struct SiteApp;

impl Hooks for SiteApp {
    fn routes(manifest: &Manifest) -> RouterService {
        build_router(manifest)
    }
}

pub fn build_router(manifest: &Manifest) -> RouterService {
    let badge = Arc::new(BadgeProxy::from_config(&manifest.proxy.badge));
    let media = Arc::new(MediaProxy::from_config(&manifest.proxy.media));
    let media_root = media.prefix().to_string();
    let media_glob = format!("{}{{*path}}", media_root);

    let badge_handler = move |ctx: RequestContext| {
        let badge = Arc::clone(&badge);
        async move { Ok::<_, EdgeError>(badge.handle(ctx).await) }
    };
    let media_handler = move |ctx: RequestContext| {
        let media = Arc::clone(&media);
        async move { Ok::<_, EdgeError>(media.handle(ctx).await) }
    };

    RouterService::builder()
        .middleware(RequestLogger)
        .get("/api/test", smoke_test)
        .get("/api/loading-profile", loading_profile)
        .any(BADGE_PATH, badge_handler)
        .get(&media_root, media_handler.clone())
        .get(&media_glob, media_handler.clone())
        .options(&media_root, media_handler.clone())
        .options(&media_glob, media_handler)
        .build()
}
