use std::net::{SocketAddr, TcpListener as StdTcpListener};

use anyhow::Context;
use axum::Router;
use log::LevelFilter;
use practice_edge_core::app::Hooks;
use practice_edge_core::manifest::{Manifest, ManifestLoader, ResolvedLoggingConfig};
use practice_edge_core::router::RouterService;
use simple_logger::SimpleLogger;
use tokio::runtime::Builder as RuntimeBuilder;
use tokio::signal;
use tower::{service_fn, Service};

use crate::service::PracticeEdgeAxumService;

/// Adapter key used for `[logging.axum]` and `[adapters.axum]` manifest sections.
const ADAPTER: &str = "axum";

#[derive(Clone, Debug)]
pub struct AxumDevServerConfig {
    pub addr: SocketAddr,
    pub enable_ctrl_c: bool,
}

impl AxumDevServerConfig {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            addr: manifest.address_for(ADAPTER),
            ..Self::default()
        }
    }
}

impl Default for AxumDevServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            enable_ctrl_c: true,
        }
    }
}

/// Blocking server that owns its tokio runtime.
pub struct AxumDevServer {
    router: RouterService,
    config: AxumDevServerConfig,
}

impl AxumDevServer {
    pub fn new(router: RouterService) -> Self {
        Self::with_config(router, AxumDevServerConfig::default())
    }

    pub fn with_config(router: RouterService, config: AxumDevServerConfig) -> Self {
        Self { router, config }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let runtime = RuntimeBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to build tokio runtime")?;

        runtime.block_on(self.run_async())
    }

    async fn run_async(self) -> anyhow::Result<()> {
        let AxumDevServer { router, config } = self;

        // Bind synchronously so an occupied port fails before the server starts.
        let listener = StdTcpListener::bind(config.addr)
            .with_context(|| format!("failed to bind server to {}", config.addr))?;
        listener
            .set_nonblocking(true)
            .context("failed to set listener to non-blocking")?;
        let listener = tokio::net::TcpListener::from_std(listener)
            .context("failed to adopt std listener into tokio")?;

        serve_with_listener(router, listener, config.enable_ctrl_c).await
    }

    #[cfg(test)]
    async fn run_with_listener(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        let AxumDevServer { router, config } = self;
        serve_with_listener(router, listener, config.enable_ctrl_c).await
    }
}

async fn serve_with_listener(
    router: RouterService,
    listener: tokio::net::TcpListener,
    enable_ctrl_c: bool,
) -> anyhow::Result<()> {
    let service = PracticeEdgeAxumService::new(router);
    let app = Router::new().fallback_service(service_fn(move |req| {
        let mut svc = service.clone();
        async move { svc.call(req).await }
    }));
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();

    let server = axum::serve(listener, make_service);
    if enable_ctrl_c {
        server
            .with_graceful_shutdown(async {
                let _ = signal::ctrl_c().await;
                log::info!("shutdown requested");
            })
            .await
            .context("axum server error")?;
    } else {
        server.await.context("axum server error")?;
    }

    Ok(())
}

/// Installs `simple_logger` at the configured level. Silenced when `echo_stdout` is off.
///
/// A logger installed earlier wins; the second install is ignored.
pub fn init_logger(logging: &ResolvedLoggingConfig) {
    let level = if logging.echo_stdout {
        LevelFilter::from(logging.level)
    } else {
        LevelFilter::Off
    };
    SimpleLogger::new().with_level(level).init().ok();
}

/// Loads the manifest, builds `A`, and serves it until ctrl-c.
pub fn run_app<A: Hooks>(manifest_src: &str) -> anyhow::Result<()> {
    let loader = ManifestLoader::load_from_str(manifest_src).context("invalid manifest")?;
    let manifest = loader.manifest();
    init_logger(&manifest.logging_or_default(ADAPTER));

    let app = A::build_app(manifest);
    let config = AxumDevServerConfig::from_manifest(manifest);
    log::info!("starting {} on http://{}", app.name(), config.addr);

    AxumDevServer::with_config(app.into_router(), config).run()
}
