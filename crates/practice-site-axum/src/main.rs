use practice_site::SiteApp;

const MANIFEST: &str = include_str!("../../../practice-edge.toml");

fn main() {
    if let Err(err) = practice_edge_adapter_axum::run_app::<SiteApp>(MANIFEST) {
        eprintln!("practice-site-axum failed: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::MANIFEST;
    use practice_edge_core::manifest::{LogLevel, ManifestLoader};

    #[test]
    fn bundled_manifest_is_valid() {
        let loader = ManifestLoader::load_from_str(MANIFEST).expect("manifest");
        let manifest = loader.manifest();
        assert_eq!(manifest.app_name(), "practice-site");
        assert_eq!(manifest.proxy.media.prefix, "/media/");
        assert_eq!(manifest.logging_or_default("axum").level, LogLevel::Info);
        assert_eq!(manifest.address_for("axum").port(), 8787);
    }
}
