use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// `navigator.connection.effectiveType`, or the `ECT` client hint.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum EffectiveConnectionType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl EffectiveConnectionType {
    /// Parse a reported value; anything unrecognised is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow-2g" => Self::Slow2g,
            "2g" => Self::TwoG,
            "3g" => Self::ThreeG,
            "4g" => Self::FourG,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow2g => "slow-2g",
            Self::TwoG => "2g",
            Self::ThreeG => "3g",
            Self::FourG => "4g",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_slow(&self) -> bool {
        matches!(self, Self::Slow2g | Self::TwoG)
    }
}

/// The network-information capability. Platforms without it report `None` from
/// [`CapabilityProvider::network`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NetworkInformation {
    pub effective_type: EffectiveConnectionType,
}

impl NetworkInformation {
    pub fn new(effective_type: EffectiveConnectionType) -> Self {
        Self { effective_type }
    }
}

/// Platform signals the loading policy reads. Each call is a fresh sample.
pub trait CapabilityProvider {
    fn prefers_reduced_motion(&self) -> bool;

    fn network(&self) -> Option<NetworkInformation>;
}

impl<P> CapabilityProvider for &P
where
    P: CapabilityProvider + ?Sized,
{
    fn prefers_reduced_motion(&self) -> bool {
        (**self).prefers_reduced_motion()
    }

    fn network(&self) -> Option<NetworkInformation> {
        (**self).network()
    }
}

/// Fixed capability values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CapabilitySnapshot {
    pub prefers_reduced_motion: bool,
    pub network: Option<NetworkInformation>,
}

impl CapabilitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.prefers_reduced_motion = reduced;
        self
    }

    #[must_use]
    pub fn with_connection(mut self, effective_type: EffectiveConnectionType) -> Self {
        self.network = Some(NetworkInformation::new(effective_type));
        self
    }
}

impl CapabilityProvider for CapabilitySnapshot {
    fn prefers_reduced_motion(&self) -> bool {
        self.prefers_reduced_motion
    }

    fn network(&self) -> Option<NetworkInformation> {
        self.network
    }
}

pub const SEC_CH_UA_MOBILE: &str = "sec-ch-ua-mobile";
pub const ECT: &str = "ect";
pub const SEC_CH_PREFERS_REDUCED_MOTION: &str = "sec-ch-prefers-reduced-motion";

/// Capability signals a browser sends as client hints.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClientHints {
    /// `Sec-CH-UA-Mobile` (`?1` → true).
    pub mobile: Option<bool>,
    /// `ECT`; absent means the network capability is unavailable.
    pub effective_type: Option<EffectiveConnectionType>,
    /// `Sec-CH-Prefers-Reduced-Motion: reduce`.
    pub reduced_motion: Option<bool>,
}

impl ClientHints {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let value = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
        };

        let hints = Self {
            mobile: value(SEC_CH_UA_MOBILE).and_then(parse_structured_bool),
            effective_type: value(ECT).map(EffectiveConnectionType::parse),
            reduced_motion: value(SEC_CH_PREFERS_REDUCED_MOTION)
                .map(|value| value.eq_ignore_ascii_case("reduce")),
        };
        log::debug!("client hints: {:?}", hints);
        hints
    }

    /// Mobile flag; missing or malformed hints count as desktop.
    pub fn is_mobile(&self) -> bool {
        self.mobile.unwrap_or(false)
    }
}

impl CapabilityProvider for ClientHints {
    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion.unwrap_or(false)
    }

    fn network(&self) -> Option<NetworkInformation> {
        self.effective_type.map(NetworkInformation::new)
    }
}

fn parse_structured_bool(value: &str) -> Option<bool> {
    match value {
        "?1" => Some(true),
        "?0" => Some(false),
        _ => None,
    }
}
