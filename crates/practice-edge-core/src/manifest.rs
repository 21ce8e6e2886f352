use log::LevelFilter;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

pub const DEFAULT_APP_NAME: &str = "practice-site";
pub const DEFAULT_BADGE_UPSTREAM: &str = "https://coc.codes/images/badge/2024063532";
pub const DEFAULT_MEDIA_UPSTREAM: &str = "https://media.inboundwizard.com";
pub const DEFAULT_MEDIA_PREFIX: &str = "/media/";
pub const DEFAULT_DEV_PORT: u16 = 8787;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("manifest failed validation: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Parsed, validated `practice-edge.toml`. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ManifestLoader {
    manifest: Arc<Manifest>,
}

impl ManifestLoader {
    pub fn load_from_str(contents: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(contents)?;
        manifest.validate()?;
        Ok(Self {
            manifest: Arc::new(manifest),
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self {
            manifest: Arc::new(Manifest::default()),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct Manifest {
    #[serde(default)]
    #[validate(nested)]
    pub app: ManifestApp,
    #[serde(default)]
    #[validate(nested)]
    pub proxy: ManifestProxy,
    #[serde(default)]
    #[validate(nested)]
    pub logging: ManifestLogging,
    #[serde(default)]
    pub adapters: BTreeMap<String, ManifestAdapter>,
}

impl Manifest {
    pub fn app_name(&self) -> &str {
        self.app.name.as_deref().unwrap_or(DEFAULT_APP_NAME)
    }

    /// Logging settings for `adapter`, matched case-insensitively. Unlisted adapters log at info.
    pub fn logging_or_default(&self, adapter: &str) -> ResolvedLoggingConfig {
        self.logging
            .adapters
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(adapter))
            .map(|(_, cfg)| ResolvedLoggingConfig::from_manifest(cfg))
            .unwrap_or_default()
    }

    /// Listen address for `adapter`, falling back to `127.0.0.1:8787`.
    pub fn address_for(&self, adapter: &str) -> SocketAddr {
        self.adapters
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(adapter))
            .and_then(|(_, cfg)| cfg.address)
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_DEV_PORT)))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ManifestApp {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ManifestProxy {
    #[serde(default)]
    #[validate(nested)]
    pub badge: BadgeProxyConfig,
    #[serde(default)]
    #[validate(nested)]
    pub media: MediaProxyConfig,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct BadgeProxyConfig {
    #[serde(default = "default_badge_upstream")]
    #[validate(url)]
    pub upstream: String,
}

impl Default for BadgeProxyConfig {
    fn default() -> Self {
        Self {
            upstream: default_badge_upstream(),
        }
    }
}

/// `upstream` is the media origin without a trailing slash; `prefix` is stripped once from the
/// inbound path before the remainder is appended.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct MediaProxyConfig {
    #[serde(default = "default_media_upstream")]
    #[validate(url)]
    pub upstream: String,
    #[serde(default = "default_media_prefix")]
    #[validate(custom(function = "validate_prefix"))]
    pub prefix: String,
}

impl Default for MediaProxyConfig {
    fn default() -> Self {
        Self {
            upstream: default_media_upstream(),
            prefix: default_media_prefix(),
        }
    }
}

fn default_badge_upstream() -> String {
    DEFAULT_BADGE_UPSTREAM.to_string()
}

fn default_media_upstream() -> String {
    DEFAULT_MEDIA_UPSTREAM.to_string()
}

fn default_media_prefix() -> String {
    DEFAULT_MEDIA_PREFIX.to_string()
}

fn validate_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.contains(['{', '}']) {
        return Err(ValidationError::new("prefix")
            .with_message("prefix must not contain route parameter braces".into()));
    }
    if prefix.len() > 1 && prefix.starts_with('/') && prefix.ends_with('/') {
        Ok(())
    } else {
        Err(ValidationError::new("prefix")
            .with_message("prefix must start and end with '/' and name a segment".into()))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ManifestLogging {
    #[serde(flatten)]
    #[validate(nested)]
    pub adapters: BTreeMap<String, ManifestLoggingConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct ManifestLoggingConfig {
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub echo_stdout: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ManifestAdapter {
    #[serde(default)]
    pub address: Option<SocketAddr>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedLoggingConfig {
    pub level: LogLevel,
    pub echo_stdout: bool,
}

impl Default for ResolvedLoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            echo_stdout: true,
        }
    }
}

impl ResolvedLoggingConfig {
    fn from_manifest(cfg: &ManifestLoggingConfig) -> Self {
        let defaults = Self::default();
        Self {
            level: cfg.level.unwrap_or(defaults.level),
            echo_stdout: cfg.echo_stdout.unwrap_or(defaults.echo_stdout),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Off => "off",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "off" => Ok(Self::Off),
            other => Err(serde::de::Error::custom(format!(
                "logging level must be trace, debug, info, warn, error, or off (got `{}`)",
                other
            ))),
        }
    }
}
