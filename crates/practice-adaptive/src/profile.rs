use serde::Serialize;

use crate::capability::{CapabilityProvider, EffectiveConnectionType};

/// Device and network signals sampled for one evaluation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub prefers_reduced_motion: bool,
    pub connection_effective_type: EffectiveConnectionType,
    /// Whether the network capability was available at all.
    #[serde(skip)]
    pub has_network_information: bool,
}

impl DeviceProfile {
    /// True only when the network capability exists and reports `slow-2g` or `2g`.
    pub fn is_slow_connection(&self) -> bool {
        self.has_network_information && self.connection_effective_type.is_slow()
    }
}

/// Read reduced-motion and network capabilities once each.
pub fn compute_profile<P>(is_mobile: bool, capabilities: &P) -> DeviceProfile
where
    P: CapabilityProvider + ?Sized,
{
    let prefers_reduced_motion = capabilities.prefers_reduced_motion();
    let network = capabilities.network();
    DeviceProfile {
        is_mobile,
        prefers_reduced_motion,
        connection_effective_type: network.map(|n| n.effective_type).unwrap_or_default(),
        has_network_information: network.is_some(),
    }
}
