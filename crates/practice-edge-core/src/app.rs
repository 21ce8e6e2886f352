use crate::manifest::Manifest;
use crate::router::RouterService;

/// Router plus the display name adapters log at startup.
pub struct App {
    router: RouterService,
    name: String,
}

impl App {
    pub fn with_name<S>(router: RouterService, name: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            router,
            name: name.into(),
        }
    }

    pub fn router(&self) -> &RouterService {
        &self.router
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_router(self) -> RouterService {
        self.router
    }
}

/// Implemented once per application; adapters call [`Hooks::build_app`] with the loaded manifest.
pub trait Hooks {
    /// Build the route table from configuration.
    fn routes(manifest: &Manifest) -> RouterService;

    fn build_app(manifest: &Manifest) -> App
    where
        Self: Sized,
    {
        App::with_name(Self::routes(manifest), manifest.app_name())
    }
}
